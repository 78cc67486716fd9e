//! Base lift lifecycle shared by everything a holder can carry.
//!
//! Picking up moves the body's own colliders to the holder's layer and turns
//! its gravity off; dropping undoes exactly that. Cable segments layer their
//! own behaviour around these two calls.

use engine_core::{Entity, Vec3, World};
use physics::{ColliderHandle, InteractionGroups, PhysicsBody, PhysicsWorld, RigidBodyHandle};
use physics::CollisionLayer;

use crate::error::{CablingError, Result};

#[derive(Debug, Clone, Default)]
pub struct Liftable {
    /// Extra euler rotation (radians, x = pitch, y = yaw, z = roll) applied on
    /// top of the hand orientation while held.
    pub lift_direction_offset: Vec3,
    holder: Option<Entity>,
    saved_layers: Vec<(ColliderHandle, InteractionGroups)>,
    saved_gravity_scale: f32,
}

impl Liftable {
    pub fn new(lift_direction_offset: Vec3) -> Self {
        Self {
            lift_direction_offset,
            ..Default::default()
        }
    }

    pub fn is_lift(&self) -> bool {
        self.holder.is_some()
    }

    /// The holder carrying this object, if any.
    pub fn holder(&self) -> Option<Entity> {
        self.holder
    }
}

pub(crate) fn body_handle(world: &World, entity: Entity) -> Result<RigidBodyHandle> {
    Ok(world.get::<&PhysicsBody>(entity)?.rigid_body)
}

pub fn is_lift(world: &World, entity: Entity) -> bool {
    world
        .get::<&Liftable>(entity)
        .map(|l| l.is_lift())
        .unwrap_or(false)
}

pub fn holder_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<&Liftable>(entity).ok().and_then(|l| l.holder)
}

/// Attach `entity` to `holder`. Rejected (returns `false`) if already held or
/// not liftable.
pub fn pick_up(
    world: &World,
    physics: &mut PhysicsWorld,
    entity: Entity,
    holder: Entity,
    layer: CollisionLayer,
) -> bool {
    match try_pick_up(world, physics, entity, holder, layer) {
        Ok(picked) => picked,
        Err(e) => {
            log::debug!("pick up of {:?} skipped: {}", entity, e);
            false
        }
    }
}

fn try_pick_up(
    world: &World,
    physics: &mut PhysicsWorld,
    entity: Entity,
    holder: Entity,
    layer: CollisionLayer,
) -> Result<bool> {
    let body = body_handle(world, entity)?;
    let mut liftable = world.get::<&mut Liftable>(entity)?;
    if liftable.is_lift() {
        log::warn!("{:?} is already held, ignoring pick up", entity);
        return Ok(false);
    }
    let gravity = physics
        .gravity_scale(body)
        .ok_or(CablingError::MissingBody(body))?;

    liftable.saved_layers.clear();
    for collider in physics.body_colliders(body) {
        if let Some(groups) = physics.collision_groups(collider) {
            liftable.saved_layers.push((collider, groups));
            physics.set_collision_groups(collider, layer.groups());
        }
    }
    liftable.saved_gravity_scale = gravity;
    physics.set_gravity_scale(body, 0.0);
    liftable.holder = Some(holder);

    log::debug!("{:?} picked up by {:?}", entity, holder);
    Ok(true)
}

/// Release `entity` back to the simulation. Returns `false` if it was not held.
pub fn drop(world: &World, physics: &mut PhysicsWorld, entity: Entity) -> bool {
    match try_drop(world, physics, entity) {
        Ok(dropped) => dropped,
        Err(e) => {
            log::debug!("drop of {:?} skipped: {}", entity, e);
            false
        }
    }
}

fn try_drop(world: &World, physics: &mut PhysicsWorld, entity: Entity) -> Result<bool> {
    let body = body_handle(world, entity)?;
    let mut liftable = world.get::<&mut Liftable>(entity)?;
    if !liftable.is_lift() {
        log::debug!("{:?} is not held, ignoring drop", entity);
        return Ok(false);
    }

    for (collider, groups) in liftable.saved_layers.drain(..) {
        physics.set_collision_groups(collider, groups);
    }
    physics.set_gravity_scale(body, liftable.saved_gravity_scale);
    liftable.holder = None;

    log::debug!("{:?} dropped", entity);
    Ok(true)
}
