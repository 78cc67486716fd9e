//! Connector endpoints: plugs and sockets at the ends of cables.
//!
//! A connection is symmetric (both sides point at each other) and physical:
//! the two bodies are welded with a fixed joint until disconnected.

use engine_core::{Entity, Quat, Vec3, World};
use physics::{to_isometry, ImpulseJointHandle, PhysicsWorld};

use crate::error::{CablingError, Result};
use crate::liftable::body_handle;

/// Signal carried by a connector; only like kinds mate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    Power,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Plug,
    Socket,
}

#[derive(Debug, Clone)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub gender: Gender,
    /// Connection point relative to the body origin, in body space.
    pub point_offset: Vec3,
    /// Orientation of the connection point in body space. Its forward (-Z)
    /// is the direction a partner leaves in.
    pub point_rotation: Quat,
    /// Applied on top of a partner's connection rotation when snapping onto it.
    pub rotation_offset: Quat,
    connected_to: Option<Entity>,
    joint: Option<ImpulseJointHandle>,
}

impl Connector {
    pub fn new(kind: ConnectorKind, gender: Gender, point_offset: Vec3) -> Self {
        Self {
            kind,
            gender,
            point_offset,
            point_rotation: Quat::IDENTITY,
            rotation_offset: Quat::from_rotation_y(std::f32::consts::PI),
            connected_to: None,
            joint: None,
        }
    }

    pub fn connected_to(&self) -> Option<Entity> {
        self.connected_to
    }

    pub fn is_connected(&self) -> bool {
        self.connected_to.is_some()
    }

    fn mates_with(&self, other: &Connector) -> bool {
        self.kind == other.kind && self.gender != other.gender
    }
}

/// World-space pose of a connection point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl ConnectionPose {
    /// Direction a partner leaves the connection point in.
    pub fn out_direction(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }
}

/// Where to put a body so its connection point meets `target`, pushed
/// `out_offset` along the target's out direction.
///
/// The body's own connection offset is evaluated with the snapped rotation,
/// so the connection points line up even though the body origins differ.
pub fn snap_pose(
    target: ConnectionPose,
    out_offset: f32,
    rotation_offset: Quat,
    point_offset: Vec3,
) -> (Vec3, Quat) {
    let rotation = target.rotation * rotation_offset;
    let position = target.position + target.out_direction() * out_offset - rotation * point_offset;
    (position, rotation)
}

pub fn is_connected(world: &World, entity: Entity) -> bool {
    connected_to(world, entity).is_some()
}

pub fn connected_to(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<&Connector>(entity).ok().and_then(|c| c.connected_to)
}

pub fn has_connector(world: &World, entity: Entity) -> bool {
    world.get::<&Connector>(entity).is_ok()
}

/// Current world pose of `entity`'s connection point.
pub fn connection_pose(world: &World, physics: &PhysicsWorld, entity: Entity) -> Option<ConnectionPose> {
    try_connection_pose(world, physics, entity).ok()
}

fn try_connection_pose(world: &World, physics: &PhysicsWorld, entity: Entity) -> Result<ConnectionPose> {
    let body = body_handle(world, entity)?;
    let connector = world.get::<&Connector>(entity)?;
    let position = physics.body_position(body).ok_or(CablingError::MissingBody(body))?;
    let rotation = physics.body_rotation(body).ok_or(CablingError::MissingBody(body))?;
    Ok(ConnectionPose {
        position: position + rotation * connector.point_offset,
        rotation: rotation * connector.point_rotation,
    })
}

/// Whether `a` and `b` may be connected right now.
pub fn can_connect(world: &World, a: Entity, b: Entity) -> bool {
    if a == b {
        return false;
    }
    let (Ok(ca), Ok(cb)) = (world.get::<&Connector>(a), world.get::<&Connector>(b)) else {
        return false;
    };
    !ca.is_connected() && !cb.is_connected() && ca.mates_with(&cb)
}

/// Plug `incoming` into `target`: snap it onto the target's connection point,
/// weld the bodies, and link both sides. Returns `false` if incompatible.
pub fn connect(world: &World, physics: &mut PhysicsWorld, target: Entity, incoming: Entity) -> bool {
    if !can_connect(world, target, incoming) {
        log::debug!("{:?} cannot connect to {:?}", incoming, target);
        return false;
    }
    match try_connect(world, physics, target, incoming) {
        Ok(()) => {
            log::info!("{:?} connected to {:?}", incoming, target);
            true
        }
        Err(e) => {
            log::warn!("connecting {:?} to {:?} failed: {}", incoming, target, e);
            false
        }
    }
}

fn try_connect(world: &World, physics: &mut PhysicsWorld, target: Entity, incoming: Entity) -> Result<()> {
    let target_body = body_handle(world, target)?;
    let incoming_body = body_handle(world, incoming)?;
    let target_pose = try_connection_pose(world, physics, target)?;
    let (rotation_offset, point_offset) = {
        let c = world.get::<&Connector>(incoming)?;
        (c.rotation_offset, c.point_offset)
    };

    let (position, rotation) = snap_pose(target_pose, 0.0, rotation_offset, point_offset);
    physics.set_body_pose(incoming_body, position, rotation);
    physics.zero_velocity(incoming_body);

    let target_position = physics
        .body_position(target_body)
        .ok_or(CablingError::MissingBody(target_body))?;
    let target_rotation = physics
        .body_rotation(target_body)
        .ok_or(CablingError::MissingBody(target_body))?;
    let inverse = target_rotation.inverse();
    let frame = to_isometry(inverse * (position - target_position), inverse * rotation);
    let joint = physics.add_fixed_joint(target_body, incoming_body, frame);

    {
        let mut c = world.get::<&mut Connector>(target)?;
        c.connected_to = Some(incoming);
        c.joint = Some(joint);
    }
    {
        let mut c = world.get::<&mut Connector>(incoming)?;
        c.connected_to = Some(target);
        c.joint = Some(joint);
    }
    Ok(())
}

/// Break `entity`'s connection, both sides. Returns `false` if it was not connected.
pub fn disconnect(world: &World, physics: &mut PhysicsWorld, entity: Entity) -> bool {
    let (partner, joint) = match world.get::<&mut Connector>(entity) {
        Ok(mut c) => match c.connected_to.take() {
            Some(partner) => (partner, c.joint.take()),
            None => return false,
        },
        Err(_) => return false,
    };
    if let Ok(mut c) = world.get::<&mut Connector>(partner) {
        if c.connected_to == Some(entity) {
            c.connected_to = None;
            c.joint = None;
        }
    }
    if let Some(joint) = joint {
        physics.remove_joint(joint);
    }
    log::info!("{:?} disconnected from {:?}", entity, partner);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::{CollisionLayer, PhysicsBody};

    fn spawn(
        world: &mut World,
        physics: &mut PhysicsWorld,
        position: Vec3,
        kind: ConnectorKind,
        gender: Gender,
    ) -> Entity {
        let body = physics.add_dynamic_body(position, Quat::IDENTITY);
        let collider = physics.add_sphere_collider(body, 0.05, CollisionLayer::Cable, 0);
        world.spawn((
            PhysicsBody::with_collider(body, collider),
            Connector::new(kind, gender, Vec3::new(0.0, 0.0, -0.1)),
        ))
    }

    #[test]
    fn compatibility_rules() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::new();
        let plug = spawn(&mut world, &mut physics, Vec3::ZERO, ConnectorKind::Power, Gender::Plug);
        let socket = spawn(&mut world, &mut physics, Vec3::X, ConnectorKind::Power, Gender::Socket);
        let other_plug = spawn(&mut world, &mut physics, Vec3::Y, ConnectorKind::Power, Gender::Plug);
        let data_socket = spawn(&mut world, &mut physics, Vec3::Z, ConnectorKind::Data, Gender::Socket);
        let bare = world.spawn(());

        assert!(can_connect(&world, plug, socket));
        assert!(can_connect(&world, socket, plug));
        assert!(!can_connect(&world, plug, plug));
        assert!(!can_connect(&world, plug, other_plug));
        assert!(!can_connect(&world, plug, data_socket));
        assert!(!can_connect(&world, plug, bare));
    }

    #[test]
    fn connect_is_symmetric_and_aligns_points() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::new();
        let socket = spawn(&mut world, &mut physics, Vec3::ZERO, ConnectorKind::Power, Gender::Socket);
        let plug = spawn(&mut world, &mut physics, Vec3::new(1.0, 1.0, 1.0), ConnectorKind::Power, Gender::Plug);

        assert!(connect(&world, &mut physics, socket, plug));
        assert_eq!(connected_to(&world, socket), Some(plug));
        assert_eq!(connected_to(&world, plug), Some(socket));
        assert!(!can_connect(&world, socket, plug));

        let a = connection_pose(&world, &physics, socket).unwrap();
        let b = connection_pose(&world, &physics, plug).unwrap();
        assert!((a.position - b.position).length() < 1e-4);
    }

    #[test]
    fn disconnect_clears_both_sides_and_joint() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::new();
        let socket = spawn(&mut world, &mut physics, Vec3::ZERO, ConnectorKind::Data, Gender::Socket);
        let plug = spawn(&mut world, &mut physics, Vec3::X, ConnectorKind::Data, Gender::Plug);
        assert!(connect(&world, &mut physics, socket, plug));
        let joint = world.get::<&Connector>(plug).unwrap().joint.unwrap();

        assert!(disconnect(&world, &mut physics, plug));
        assert!(!is_connected(&world, plug));
        assert!(!is_connected(&world, socket));
        assert!(!physics.has_joint(joint));
        assert!(!disconnect(&world, &mut physics, plug));
    }

    #[test]
    fn snap_pose_places_point_on_target_plus_offset() {
        let target = ConnectionPose {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Quat::IDENTITY,
        };
        let point_offset = Vec3::new(0.0, 0.0, -0.1);
        let rotation_offset = Quat::from_rotation_y(std::f32::consts::PI);
        let (position, rotation) = snap_pose(target, 0.2, rotation_offset, point_offset);

        // Connection point of the snapped body sits 0.2 out along -Z from the target point.
        let point = position + rotation * point_offset;
        assert!((point - Vec3::new(0.0, 1.0, -0.2)).length() < 1e-5);
        assert!(rotation.angle_between(rotation_offset) < 1e-5);
    }
}
