//! Collision layers, filtering, and the ECS link to physics handles.

use engine_core::Entity;
use rapier3d::prelude::*;

/// Collision layers. Each layer is one membership bit; the filter decides
/// which other layers it may touch.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionLayer {
    /// Static environment (floor, props)
    Environment = 1 << 0,
    /// Player character
    Player = 1 << 1,
    /// Walls and fixtures cables can be pinned to
    Surface = 1 << 2,
    /// Cable segments at rest
    Cable = 1 << 3,
    /// Whatever the player is carrying, and its whole cable while carried
    HeldObject = 1 << 4,
}

impl CollisionLayer {
    const ALL_LAYERS: [CollisionLayer; 5] = [
        CollisionLayer::Environment,
        CollisionLayer::Player,
        CollisionLayer::Surface,
        CollisionLayer::Cable,
        CollisionLayer::HeldObject,
    ];

    fn bits(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// Membership and filter for this layer.
    pub fn groups(self) -> InteractionGroups {
        let filter = match self {
            Self::Environment | Self::Surface | Self::Cable => Group::ALL,
            // Held objects and the player ignore each other so a carried cable
            // never shoves the one carrying it.
            Self::Player => Group::ALL.difference(Self::HeldObject.bits()),
            Self::HeldObject => Group::ALL.difference(Self::Player.bits()),
        };
        InteractionGroups::new(self.bits(), filter)
    }

    /// Recover the layer from a collider's groups, if its membership is a single known layer.
    pub fn of(groups: InteractionGroups) -> Option<CollisionLayer> {
        Self::ALL_LAYERS
            .into_iter()
            .find(|layer| groups.memberships == layer.bits())
    }
}

/// Component linking an ECS entity to its physics handles.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: Option<ColliderHandle>,
}

impl PhysicsBody {
    pub fn new(rigid_body: RigidBodyHandle) -> Self {
        Self {
            rigid_body,
            collider: None,
        }
    }

    pub fn with_collider(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider: Some(collider),
        }
    }
}

/// Encode an entity into collider user data so query hits map back to the ECS.
pub fn entity_user_data(entity: Entity) -> u128 {
    entity.to_bits().get() as u128
}

/// Decode collider user data written by [`entity_user_data`]. Zero means "no entity".
pub fn entity_from_user_data(data: u128) -> Option<Entity> {
    u64::try_from(data).ok().and_then(Entity::from_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interacts(a: CollisionLayer, b: CollisionLayer) -> bool {
        a.groups().test(b.groups())
    }

    #[test]
    fn held_objects_ignore_player() {
        assert!(!interacts(CollisionLayer::HeldObject, CollisionLayer::Player));
        assert!(!interacts(CollisionLayer::Player, CollisionLayer::HeldObject));
    }

    #[test]
    fn cables_touch_player_and_surfaces() {
        assert!(interacts(CollisionLayer::Cable, CollisionLayer::Player));
        assert!(interacts(CollisionLayer::Cable, CollisionLayer::Surface));
        assert!(interacts(CollisionLayer::HeldObject, CollisionLayer::Surface));
    }

    #[test]
    fn layer_round_trips_through_groups() {
        for layer in CollisionLayer::ALL_LAYERS {
            assert_eq!(CollisionLayer::of(layer.groups()), Some(layer));
        }
        assert_eq!(CollisionLayer::of(InteractionGroups::all()), None);
    }

    #[test]
    fn entity_user_data_round_trip() {
        let mut world = engine_core::World::new();
        let e = world.spawn((1u32,));
        assert_eq!(entity_from_user_data(entity_user_data(e)), Some(e));
        assert_eq!(entity_from_user_data(0), None);
    }
}
