//! Dispatch between the segment flavours and the plain liftable base.

use engine_core::{Entity, World};
use physics::{CollisionLayer, PhysicsWorld};

use crate::cable_connector::{self, CableConnector};
use crate::connector;
use crate::liftable;
use crate::pin_point::{self, PinPoint};

/// Where a segment is in its lifecycle. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    Free,
    Held,
    Pinned,
    Connected,
}

pub fn state(world: &World, entity: Entity) -> SegmentState {
    if liftable::is_lift(world, entity) {
        SegmentState::Held
    } else if pin_point::is_pinned(world, entity) {
        SegmentState::Pinned
    } else if connector::is_connected(world, entity) {
        SegmentState::Connected
    } else {
        SegmentState::Free
    }
}

pub fn pick_up(
    world: &World,
    physics: &mut PhysicsWorld,
    entity: Entity,
    holder: Entity,
    layer: CollisionLayer,
) -> bool {
    if world.get::<&PinPoint>(entity).is_ok() {
        pin_point::pick_up(world, physics, entity, holder, layer)
    } else if world.get::<&CableConnector>(entity).is_ok() {
        cable_connector::pick_up(world, physics, entity, holder, layer)
    } else {
        liftable::pick_up(world, physics, entity, holder, layer)
    }
}

pub fn drop(world: &World, physics: &mut PhysicsWorld, entity: Entity) -> bool {
    if world.get::<&PinPoint>(entity).is_ok() {
        pin_point::drop(world, physics, entity)
    } else if world.get::<&CableConnector>(entity).is_ok() {
        cable_connector::drop(world, physics, entity)
    } else {
        liftable::drop(world, physics, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::CableRig;
    use crate::CablingConfig;
    use engine_core::{Transform, Vec3};

    #[test]
    fn state_tracks_pin_lifecycle() {
        let mut rig = CableRig::new(CablingConfig::default());
        rig.spawn_surface("floor", Vec3::ZERO, engine_core::Quat::IDENTITY, Vec3::new(5.0, 0.1, 5.0));
        let player = rig.spawn_holder("player", Transform::default(), Transform::default());
        let seg = rig.spawn_pin_point("seg", Vec3::new(0.0, 0.4, 0.0), 0.1);
        rig.physics.update_query_pipeline();

        assert_eq!(state(&rig.world, seg), SegmentState::Free);
        assert!(pick_up(&rig.world, &mut rig.physics, seg, player, CollisionLayer::HeldObject));
        assert_eq!(state(&rig.world, seg), SegmentState::Held);
        assert!(drop(&rig.world, &mut rig.physics, seg));
        assert_eq!(state(&rig.world, seg), SegmentState::Pinned);
        assert!(pick_up(&rig.world, &mut rig.physics, seg, player, CollisionLayer::HeldObject));
        assert_eq!(state(&rig.world, seg), SegmentState::Held);
    }

    #[test]
    fn plain_liftable_uses_base_behaviour() {
        let mut rig = CableRig::new(CablingConfig::default());
        let player = rig.spawn_holder("player", Transform::default(), Transform::default());
        let crate_box = rig.spawn_prop("crate", Vec3::new(1.0, 1.0, 1.0), 0.3);
        assert!(pick_up(&rig.world, &mut rig.physics, crate_box, player, CollisionLayer::HeldObject));
        assert_eq!(state(&rig.world, crate_box), SegmentState::Held);
        assert!(drop(&rig.world, &mut rig.physics, crate_box));
        assert_eq!(state(&rig.world, crate_box), SegmentState::Free);
    }
}
