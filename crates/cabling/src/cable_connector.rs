//! Connector-capable cable segments: the plug or socket end of a cable.
//!
//! While an end is carried, every collider of its whole chain sits on the
//! holder's layer so the dangling cable cannot collide with the player.
//! Releasing it while looking at another connector either plugs it in or,
//! when the two do not mate, parks it just in front of that connector.

use engine_core::{Entity, World};
use physics::{ColliderHandle, CollisionLayer, InteractionGroups, PhysicsWorld};

use crate::chain;
use crate::connector::{self, Connector};
use crate::holder;
use crate::liftable::{self, body_handle};

#[derive(Debug, Clone)]
pub struct CableConnector {
    /// Distance a rejected end is parked out from the connector it was dropped on.
    pub out_offset: f32,
    saved_layers: Vec<(ColliderHandle, InteractionGroups)>,
}

impl CableConnector {
    pub fn new(out_offset: f32) -> Self {
        Self {
            out_offset,
            saved_layers: Vec::new(),
        }
    }

    /// Colliders moved to the held layer and the groups they had before.
    pub fn saved_layers(&self) -> &[(ColliderHandle, InteractionGroups)] {
        &self.saved_layers
    }
}

/// Lift a cable end, unplugging it first if needed, and move its whole chain
/// onto `layer`.
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
    if connector::is_connected(world, segment) {
        connector::disconnect(world, physics, segment);
    }
    if !liftable::pick_up(world, physics, segment, holder, layer) {
        return false;
    }

    let mut saved = Vec::new();
    for member in chain::members_of(world, segment) {
        let Ok(body) = body_handle(world, member) else {
            continue;
        };
        for collider in physics.body_colliders(body) {
            if let Some(groups) = physics.collision_groups(collider) {
                saved.push((collider, groups));
                physics.set_collision_groups(collider, layer.groups());
            }
        }
    }
    log::debug!("{:?} lifted, {} chain colliders moved to {:?}", segment, saved.len(), layer);

    if let Ok(mut end) = world.get::<&mut CableConnector>(segment) {
        end.saved_layers = saved;
    }
    true
}

/// Release a carried cable end: restore chain layers, then try the
/// connector the holder is looking at, then hand the body back to physics.
pub fn drop(world: &World, physics: &mut PhysicsWorld, segment: Entity) -> bool {
    if !liftable::is_lift(world, segment) {
        log::debug!("{:?} is not held, ignoring drop", segment);
        return false;
    }

    let (saved, out_offset) = match world.get::<&mut CableConnector>(segment) {
        Ok(mut end) => (std::mem::take(&mut end.saved_layers), end.out_offset),
        Err(_) => (Vec::new(), 0.0),
    };
    for (collider, groups) in saved {
        physics.set_collision_groups(collider, groups);
    }

    let target = liftable::holder_of(world, segment)
        .and_then(|h| holder::selected_of(world, h))
        .filter(|&t| t != segment && connector::has_connector(world, t));
    if let Some(target) = target {
        if connector::can_connect(world, segment, target) {
            connector::connect(world, physics, target, segment);
        } else if !connector::is_connected(world, target) {
            park_in_front(world, physics, segment, target, out_offset);
        }
    }

    liftable::drop(world, physics, segment);
    true
}

fn park_in_front(world: &World, physics: &mut PhysicsWorld, segment: Entity, target: Entity, out_offset: f32) {
    let Some(target_pose) = connector::connection_pose(world, physics, target) else {
        return;
    };
    let Ok(body) = body_handle(world, segment) else {
        return;
    };
    let (rotation_offset, point_offset) = match world.get::<&Connector>(segment) {
        Ok(c) => (c.rotation_offset, c.point_offset),
        Err(_) => return,
    };
    let (position, rotation) = connector::snap_pose(target_pose, out_offset, rotation_offset, point_offset);
    physics.set_body_pose(body, position, rotation);
    log::debug!("{:?} parked in front of {:?}", segment, target);
}
