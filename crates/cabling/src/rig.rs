//! Scene assembly: spawns surfaces, props, holders and jointed cables into
//! one world/physics pair, and drives them a tick at a time.

use engine_core::{Appearance, Color, Entity, Name, Quat, Transform, Vec3, World};
use physics::{entity_user_data, CollisionLayer, PhysicsBody, PhysicsWorld};

use crate::cable_connector::CableConnector;
use crate::chain::{CableChain, ChainMember};
use crate::config::CablingConfig;
use crate::connector::Connector;
use crate::holder::{self, ObjectHolder};
use crate::liftable::Liftable;
use crate::pin_point::{self, PinPoint};
use crate::player_mode::PlayerModeContext;
use crate::selection::Selectable;
use crate::surface::PinnableSurface;

/// Layout of a cable to spawn: `count` segments evenly spaced from `start`
/// to `end`, both inclusive. Ends given a connector become plug/socket
/// segments; every other segment is a pin point.
#[derive(Debug, Clone)]
pub struct CableSpec {
    pub name: String,
    pub start: Vec3,
    pub end: Vec3,
    pub count: usize,
    pub segment_size: f32,
    pub head: Option<Connector>,
    pub tail: Option<Connector>,
}

impl CableSpec {
    pub fn new(name: impl Into<String>, start: Vec3, end: Vec3, count: usize) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            count,
            segment_size: 0.1,
            head: None,
            tail: None,
        }
    }

    pub fn with_head(mut self, connector: Connector) -> Self {
        self.head = Some(connector);
        self
    }

    pub fn with_tail(mut self, connector: Connector) -> Self {
        self.tail = Some(connector);
        self
    }

    pub fn with_segment_size(mut self, size: f32) -> Self {
        self.segment_size = size;
        self
    }
}

/// A spawned cable.
#[derive(Debug, Clone)]
pub struct Cable {
    pub chain: Entity,
    pub segments: Vec<Entity>,
}

pub struct CableRig {
    pub world: World,
    pub physics: PhysicsWorld,
    pub config: CablingConfig,
    pub modes: PlayerModeContext,
}

impl CableRig {
    pub fn new(config: CablingConfig) -> Self {
        log::info!("Cable rig created (gravity {})", config.gravity);
        Self {
            world: World::new(),
            physics: PhysicsWorld::with_gravity(config.gravity),
            config,
            modes: PlayerModeContext::new(),
        }
    }

    /// Static pinnable box centred at `position`.
    pub fn spawn_surface(&mut self, name: &str, position: Vec3, rotation: Quat, half_extents: Vec3) -> Entity {
        let appearance = Appearance::single(Color::GREY);
        let entity = self.world.spawn((
            Name::new(name),
            Transform::from_position_rotation(position, rotation).with_scale(half_extents * 2.0),
        ));
        let collider = self.physics.add_static_cuboid(
            position,
            rotation,
            half_extents,
            CollisionLayer::Surface,
            entity_user_data(entity),
        );
        let surface = PinnableSurface::new(collider, &appearance, self.config.surface_highlight_color);
        self.insert(entity, (appearance, surface));
        log::debug!("Spawned surface '{}' {:?}", name, entity);
        entity
    }

    /// Lone pin-capable segment of diameter `size`, not part of any chain.
    pub fn spawn_pin_point(&mut self, name: &str, position: Vec3, size: f32) -> Entity {
        let entity = self.spawn_segment(name, position, size);
        let point = PinPoint::new(self.config.pin_search_radius, self.config.pinned_color);
        self.insert(entity, (point,));
        entity
    }

    /// Ordinary liftable box with edge `size`.
    pub fn spawn_prop(&mut self, name: &str, position: Vec3, size: f32) -> Entity {
        let appearance = Appearance::single(Color::WHITE);
        let selectable = Selectable::new(&appearance, self.config.select_highlight_color);
        let body = self.physics.add_dynamic_body(position, Quat::IDENTITY);
        let entity = self.world.spawn((
            Name::new(name),
            Transform::from_position(position).with_scale(Vec3::splat(size)),
            appearance,
            selectable,
            Liftable::default(),
        ));
        let collider = self.physics.add_box_collider(
            body,
            Vec3::splat(size * 0.5),
            CollisionLayer::Environment,
            entity_user_data(entity),
        );
        self.insert(entity, (PhysicsBody::with_collider(body, collider),));
        entity
    }

    /// Holder subscribed to this rig's player modes.
    pub fn spawn_holder(&mut self, name: &str, camera: Transform, hand: Transform) -> Entity {
        let entity = self
            .world
            .spawn((Name::new(name), ObjectHolder::new(&self.config, camera, hand)));
        holder::attach(&self.world, &mut self.physics, &mut self.modes, entity);
        entity
    }

    pub fn spawn_cable(&mut self, spec: CableSpec) -> Cable {
        let count = spec.count.max(1);
        let chain = self.world.spawn((Name::new(spec.name.as_str()), CableChain::default()));

        let mut segments = Vec::with_capacity(count);
        for i in 0..count {
            let t = if count == 1 { 0.0 } else { i as f32 / (count - 1) as f32 };
            let position = spec.start.lerp(spec.end, t);
            let name = format!("{}[{}]", spec.name, i);
            let entity = self.spawn_segment(&name, position, spec.segment_size);

            let connector = match i {
                0 => spec.head.clone(),
                _ if i == count - 1 => spec.tail.clone(),
                _ => None,
            };
            match connector {
                Some(connector) => self.insert(
                    entity,
                    (connector, CableConnector::new(self.config.connect_out_offset)),
                ),
                None => self.insert(
                    entity,
                    (PinPoint::new(self.config.pin_search_radius, self.config.pinned_color),),
                ),
            }
            self.insert(entity, (ChainMember { chain },));
            segments.push(entity);
        }

        let mut links = Vec::with_capacity(count.saturating_sub(1));
        for pair in segments.windows(2) {
            let (Ok(a), Ok(b)) = (
                self.world.get::<&PhysicsBody>(pair[0]).map(|p| p.rigid_body),
                self.world.get::<&PhysicsBody>(pair[1]).map(|p| p.rigid_body),
            ) else {
                continue;
            };
            let (Some(pa), Some(pb)) = (self.physics.body_position(a), self.physics.body_position(b)) else {
                continue;
            };
            let half = (pb - pa) * 0.5;
            links.push(self.physics.add_spherical_joint(a, b, half, -half));
        }

        if let Ok(mut c) = self.world.get::<&mut CableChain>(chain) {
            c.members = segments.clone();
            c.links = links;
        }
        log::info!("Spawned cable '{}' with {} segments", spec.name, count);
        Cable { chain, segments }
    }

    /// One simulation tick: held pin-point highlighting, then holders (with
    /// `pressed` as every holder's interact button), then physics.
    pub fn tick(&mut self, dt: f32, pressed: bool) {
        self.physics.update_query_pipeline();
        pin_point::update_held(&self.world, &self.physics);

        let holders: Vec<Entity> = self
            .world
            .query::<&ObjectHolder>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        for h in holders {
            holder::update(&self.world, &mut self.physics, &mut self.modes, h, pressed);
        }

        self.physics.step(dt);
        self.sync_transforms();
    }

    /// Copy body poses back into transforms.
    pub fn sync_transforms(&mut self) {
        for (_entity, (transform, body)) in self.world.query_mut::<(&mut Transform, &PhysicsBody)>() {
            if let (Some(position), Some(rotation)) = (
                self.physics.body_position(body.rigid_body),
                self.physics.body_rotation(body.rigid_body),
            ) {
                transform.position = position;
                transform.rotation = rotation;
            }
        }
    }

    /// Jointable, selectable, liftable sphere; the flavour is added by the caller.
    fn spawn_segment(&mut self, name: &str, position: Vec3, size: f32) -> Entity {
        let appearance = Appearance::single(Color::WHITE);
        let selectable = Selectable::new(&appearance, self.config.select_highlight_color);
        let body = self.physics.add_dynamic_body(position, Quat::IDENTITY);
        let entity = self.world.spawn((
            Name::new(name),
            Transform::from_position(position).with_scale(Vec3::splat(size)),
            appearance,
            selectable,
            Liftable::default(),
        ));
        let collider = self.physics.add_sphere_collider(
            body,
            size * 0.5,
            CollisionLayer::Cable,
            entity_user_data(entity),
        );
        self.insert(entity, (PhysicsBody::with_collider(body, collider),));
        entity
    }

    fn insert(&mut self, entity: Entity, components: impl hecs::DynamicBundle) {
        if let Err(e) = self.world.insert(entity, components) {
            log::warn!("insert into {:?} failed: {}", entity, e);
        }
    }
}
