//! Cable chains: the ordered set of segments making up one physical cable.

use engine_core::{Entity, World};
use physics::ImpulseJointHandle;

/// Lives on a dedicated chain entity. Member order is creation order.
#[derive(Debug, Clone, Default)]
pub struct CableChain {
    pub members: Vec<Entity>,
    /// Joints linking consecutive members.
    pub links: Vec<ImpulseJointHandle>,
}

/// Back-reference from a segment to the chain entity it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMember {
    pub chain: Entity,
}

/// Every member of the chain `segment` belongs to, `segment` included.
/// Empty when the segment is free-floating.
pub fn members_of(world: &World, segment: Entity) -> Vec<Entity> {
    let Ok(member) = world.get::<&ChainMember>(segment) else {
        return Vec::new();
    };
    world
        .get::<&CableChain>(member.chain)
        .map(|chain| chain.members.clone())
        .unwrap_or_default()
}

/// Members of the same chain other than `segment`.
pub fn siblings_of(world: &World, segment: Entity) -> Vec<Entity> {
    members_of(world, segment)
        .into_iter()
        .filter(|&e| e != segment)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siblings_exclude_self() {
        let mut world = World::new();
        let chain = world.spawn((CableChain::default(),));
        let a = world.spawn((ChainMember { chain },));
        let b = world.spawn((ChainMember { chain },));
        let c = world.spawn((ChainMember { chain },));
        world.get::<&mut CableChain>(chain).unwrap().members = vec![a, b, c];

        assert_eq!(members_of(&world, b), vec![a, b, c]);
        assert_eq!(siblings_of(&world, b), vec![a, c]);
    }

    #[test]
    fn free_segment_has_no_siblings() {
        let mut world = World::new();
        let lone = world.spawn(());
        assert!(members_of(&world, lone).is_empty());
        assert!(siblings_of(&world, lone).is_empty());
    }

    #[test]
    fn dangling_chain_reference_is_tolerated() {
        let mut world = World::new();
        let chain = world.spawn((CableChain::default(),));
        let a = world.spawn((ChainMember { chain },));
        world.despawn(chain).unwrap();
        assert!(siblings_of(&world, a).is_empty());
    }
}
