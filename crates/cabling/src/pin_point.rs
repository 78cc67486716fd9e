//! Pin-capable cable segments.
//!
//! A pin point is an ordinary liftable cable segment that, when released
//! next to a [`PinnableSurface`], sticks to it: it is moved onto the surface
//! boundary and turned kinematic. Lifting it again unpins it.
//!
//! While one segment is carried the rest of its chain is made weightless,
//! otherwise the hanging cable drags the carried segment out of the hand.
//! Siblings that are already pinned (kinematic) are left alone.

use engine_core::{Appearance, Color, Entity, Transform, Vec3, World};
use physics::{ColliderHandle, CollisionLayer, PhysicsWorld, RigidBodyHandle};

use crate::chain;
use crate::error::{CablingError, Result};
use crate::liftable::{self, body_handle, Liftable};
use crate::selection;
use crate::surface::{self, PinnableSurface};

/// Gravity and body type of a sibling as it was when the lift began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiblingState {
    pub body: RigidBodyHandle,
    pub gravity_scale: f32,
    pub was_kinematic: bool,
}

#[derive(Debug, Clone)]
pub struct PinPoint {
    pub search_radius: f32,
    pub pinned_color: Color,
    is_pinned: bool,
    highlighted: Option<Entity>,
    saved_siblings: Vec<SiblingState>,
}

impl PinPoint {
    pub fn new(search_radius: f32, pinned_color: Color) -> Self {
        Self {
            search_radius,
            pinned_color,
            is_pinned: false,
            highlighted: None,
            saved_siblings: Vec::new(),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    /// Surface currently highlighted as the pin target.
    pub fn highlighted(&self) -> Option<Entity> {
        self.highlighted
    }

    pub fn saved_siblings(&self) -> &[SiblingState] {
        &self.saved_siblings
    }
}

/// Best pin target found by [`find_nearest_surface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub surface: Entity,
    pub collider: ColliderHandle,
    /// Closest point on the surface boundary.
    pub point: Vec3,
    pub distance: f32,
}

/// Nearest pinnable surface within `radius` of `position`, measured to each
/// candidate's closest boundary point rather than its centre. Colliders of
/// `exclude` are skipped. Equal distances keep the first candidate reported.
pub fn find_nearest_surface(
    world: &World,
    physics: &PhysicsWorld,
    position: Vec3,
    radius: f32,
    exclude: Option<RigidBodyHandle>,
) -> Option<SurfaceHit> {
    let mut best: Option<SurfaceHit> = None;
    for collider in physics.overlap_sphere(position, radius, exclude) {
        let Some(surface) = physics
            .collider_user_data(collider)
            .and_then(physics::entity_from_user_data)
        else {
            continue;
        };
        if world.get::<&PinnableSurface>(surface).is_err() {
            continue;
        }
        let Some(point) = physics.closest_point(collider, position) else {
            continue;
        };
        let distance = position.distance(point);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(SurfaceHit {
                surface,
                collider,
                point,
                distance,
            });
        }
    }
    best
}

/// [`find_nearest_surface`] around a segment's current position with its own radius.
pub fn nearest_surface_for(world: &World, physics: &PhysicsWorld, segment: Entity) -> Option<SurfaceHit> {
    let body = body_handle(world, segment).ok()?;
    let radius = world.get::<&PinPoint>(segment).ok()?.search_radius;
    let position = physics.body_position(body)?;
    find_nearest_surface(world, physics, position, radius, Some(body))
}

pub fn is_pinned(world: &World, entity: Entity) -> bool {
    world
        .get::<&PinPoint>(entity)
        .map(|p| p.is_pinned)
        .unwrap_or(false)
}

pub fn highlighted(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<&PinPoint>(entity).ok().and_then(|p| p.highlighted)
}

pub fn apply_pinned_color(world: &World, entity: Entity) {
    let Ok(point) = world.get::<&PinPoint>(entity) else {
        return;
    };
    if let Ok(mut appearance) = world.get::<&mut Appearance>(entity) {
        appearance.tint(point.pinned_color);
    }
}

/// Per-tick target search for a held segment: move the highlight to the
/// nearest surface, unhighlighting the previous one first. Returns the
/// surface highlighted after the update.
pub fn update_highlight(world: &World, physics: &PhysicsWorld, segment: Entity) -> Option<Entity> {
    if !liftable::is_lift(world, segment) {
        return highlighted(world, segment);
    }
    let nearest = nearest_surface_for(world, physics, segment).map(|hit| hit.surface);

    let previous = {
        let Ok(mut point) = world.get::<&mut PinPoint>(segment) else {
            return None;
        };
        if point.highlighted == nearest {
            return nearest;
        }
        std::mem::replace(&mut point.highlighted, nearest)
    };

    if let Some(old) = previous {
        surface::unhighlight(world, old);
    }
    if let Some(new) = nearest {
        surface::highlight(world, new);
    }
    nearest
}

/// Run [`update_highlight`] for every pin point currently held.
pub fn update_held(world: &World, physics: &PhysicsWorld) {
    let held: Vec<Entity> = world
        .query::<(&PinPoint, &Liftable)>()
        .iter()
        .filter(|(_, (_, liftable))| liftable.is_lift())
        .map(|(e, _)| e)
        .collect();
    for segment in held {
        update_highlight(world, physics, segment);
    }
}

/// Lift a pin point, unpinning it first if needed, and make the unpinned
/// rest of its chain weightless.
pub fn pick_up(
    world: &World,
    physics: &mut PhysicsWorld,
    segment: Entity,
    holder: Entity,
    layer: CollisionLayer,
) -> bool {
    if liftable::is_lift(world, segment) {
        log::warn!("{:?} is already held, ignoring pick up", segment);
        return false;
    }
    if is_pinned(world, segment) {
        unpin(world, physics, segment);
    }
    if !liftable::pick_up(world, physics, segment, holder, layer) {
        return false;
    }

    let mut saved = Vec::new();
    for sibling in chain::siblings_of(world, segment) {
        let Ok(body) = body_handle(world, sibling) else {
            continue;
        };
        let (Some(gravity_scale), Some(was_kinematic)) =
            (physics.gravity_scale(body), physics.is_kinematic(body))
        else {
            continue;
        };
        saved.push(SiblingState {
            body,
            gravity_scale,
            was_kinematic,
        });
        if !was_kinematic {
            physics.set_gravity_scale(body, 0.0);
        }
    }
    log::debug!("{:?} lifted, {} siblings suspended", segment, saved.len());

    if let Ok(mut point) = world.get::<&mut PinPoint>(segment) {
        point.saved_siblings = saved;
    }
    true
}

/// Release a held pin point. Sibling gravity is restored first; then, if a
/// surface is in reach, the segment is released and pinned within this same
/// call, otherwise it simply falls.
pub fn drop(world: &World, physics: &mut PhysicsWorld, segment: Entity) -> bool {
    if !liftable::is_lift(world, segment) {
        log::debug!("{:?} is not held, ignoring drop", segment);
        return false;
    }

    let (saved, previous) = match world.get::<&mut PinPoint>(segment) {
        Ok(mut point) => (std::mem::take(&mut point.saved_siblings), point.highlighted),
        Err(_) => (Vec::new(), None),
    };
    for state in saved {
        // Siblings pinned while we were held stay as they are.
        if physics.is_kinematic(state.body) == Some(false) {
            physics.set_gravity_scale(state.body, state.gravity_scale);
        }
    }
    if let Some(old) = previous {
        surface::unhighlight(world, old);
    }

    let target = nearest_surface_for(world, physics, segment);
    liftable::drop(world, physics, segment);
    if let Some(hit) = target {
        if let Err(e) = pin(world, physics, segment, hit.collider) {
            log::warn!("pinning {:?} failed: {}", segment, e);
        }
    }

    if let Ok(mut point) = world.get::<&mut PinPoint>(segment) {
        point.highlighted = None;
    }
    true
}

/// Snap the segment onto `surface`'s boundary and freeze it there.
pub fn pin(world: &World, physics: &mut PhysicsWorld, segment: Entity, surface: ColliderHandle) -> Result<()> {
    let body = body_handle(world, segment)?;
    let position = physics.body_position(body).ok_or(CablingError::MissingBody(body))?;
    let closest = physics
        .closest_point(surface, position)
        .ok_or(CablingError::MissingCollider(surface))?;
    let half_extent = world.get::<&Transform>(segment)?.half_extent();

    let mut normal = (position - closest).normalize_or_zero();
    if normal == Vec3::ZERO {
        normal = Vec3::Y;
    }
    let resting = closest + normal * half_extent;

    // Velocity writes are ignored once the body is kinematic.
    physics.zero_velocity(body);
    physics.set_kinematic(body, true);
    physics.set_body_position(body, resting);
    if let Ok(mut transform) = world.get::<&mut Transform>(segment) {
        transform.position = resting;
    }
    world.get::<&mut PinPoint>(segment)?.is_pinned = true;
    apply_pinned_color(world, segment);

    log::info!("{:?} pinned at {:?}", segment, resting);
    Ok(())
}

/// Release a pinned segment back to dynamic simulation and its default look.
pub fn unpin(world: &World, physics: &mut PhysicsWorld, segment: Entity) {
    match world.get::<&mut PinPoint>(segment) {
        Ok(mut point) => point.is_pinned = false,
        Err(_) => return,
    }
    if let Ok(body) = body_handle(world, segment) {
        physics.set_kinematic(body, false);
    }
    selection::deselect(world, segment);
    log::debug!("{:?} unpinned", segment);
}
