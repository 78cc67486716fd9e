//! Physics world management with Rapier3D.

use crate::collision::CollisionLayer;
use engine_core::{Quat, Vec3};
use rapier3d::prelude::*;

pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub(crate) fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

pub(crate) fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn to_rotation(q: Quat) -> Rotation<Real> {
    rapier3d::na::UnitQuaternion::from_quaternion(rapier3d::na::Quaternion::new(q.w, q.x, q.y, q.z))
}

pub(crate) fn from_rotation(rot: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w)
}

/// Build a rapier isometry from a glam position and rotation.
pub fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(to_vector(position).into(), to_rotation(rotation))
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self::with_gravity(-9.81)
    }

    /// Create a physics world with the given vertical gravity.
    pub fn with_gravity(gravity_y: f32) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, gravity_y, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Push teleported body poses to their colliders and rebuild the query
    /// acceleration structure. Needed before queries when bodies moved
    /// outside of [`PhysicsWorld::step`].
    pub fn update_query_pipeline(&mut self) {
        self.rigid_body_set
            .propagate_modified_body_positions_to_colliders(&mut self.collider_set);
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a dynamic rigid body and return its handle.
    pub fn add_dynamic_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .position(to_isometry(position, rotation))
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a sphere collider to a rigid body.
    pub fn add_sphere_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        radius: f32,
        layer: CollisionLayer,
        user_data: u128,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .collision_groups(layer.groups())
            .user_data(user_data)
            .build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a box collider to a rigid body.
    pub fn add_box_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        half_extents: Vec3,
        layer: CollisionLayer,
        user_data: u128,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .collision_groups(layer.groups())
            .user_data(user_data)
            .build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a static cuboid collider with no parent body; the collider is fixed in the world.
    /// `half_extents` are half sizes in local X, Y, Z (before rotation).
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation: Quat,
        half_extents: Vec3,
        layer: CollisionLayer,
        user_data: u128,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(to_isometry(translation, rotation))
            .collision_groups(layer.groups())
            .user_data(user_data)
            .build();
        self.collider_set.insert(collider)
    }

    // ── Body state ──────────────────────────────────────────────────────

    /// World position of a rigid body.
    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.translation()))
    }

    /// World rotation of a rigid body.
    pub fn body_rotation(&self, handle: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_rotation(body.rotation()))
    }

    /// Teleport a body. Kinematic bodies also get their next pose pinned so the
    /// following step does not drag them back.
    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let iso = to_isometry(position, rotation);
            body.set_position(iso, true);
            if body.is_kinematic() {
                body.set_next_kinematic_position(iso);
            }
        }
    }

    /// Teleport a body, keeping its rotation.
    pub fn set_body_position(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(rotation) = self.body_rotation(handle) {
            self.set_body_pose(handle, position, rotation);
        }
    }

    /// Gravity multiplier of a body; `0.0` means gravity is off.
    pub fn gravity_scale(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle).map(|body| body.gravity_scale())
    }

    pub fn set_gravity_scale(&mut self, handle: RigidBodyHandle, scale: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_gravity_scale(scale, true);
        }
    }

    /// Whether the body is kinematic (driven by code, ignores forces).
    pub fn is_kinematic(&self, handle: RigidBodyHandle) -> Option<bool> {
        self.rigid_body_set.get(handle).map(|body| body.is_kinematic())
    }

    /// Switch a body between kinematic and dynamic.
    pub fn set_kinematic(&mut self, handle: RigidBodyHandle, kinematic: bool) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let body_type = if kinematic {
                RigidBodyType::KinematicPositionBased
            } else {
                RigidBodyType::Dynamic
            };
            if body.body_type() != body_type {
                body.set_body_type(body_type, true);
            }
        }
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.linvel()))
    }

    pub fn angular_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.angvel()))
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    /// Stop a body dead: zero linear and angular velocity.
    pub fn zero_velocity(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(Vector::zeros(), true);
            body.set_angvel(Vector::zeros(), true);
        }
    }

    // ── Colliders ───────────────────────────────────────────────────────

    /// Every collider attached to a body.
    pub fn body_colliders(&self, handle: RigidBodyHandle) -> Vec<ColliderHandle> {
        self.rigid_body_set
            .get(handle)
            .map(|body| body.colliders().to_vec())
            .unwrap_or_default()
    }

    pub fn collision_groups(&self, handle: ColliderHandle) -> Option<InteractionGroups> {
        self.collider_set.get(handle).map(|c| c.collision_groups())
    }

    pub fn set_collision_groups(&mut self, handle: ColliderHandle, groups: InteractionGroups) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_collision_groups(groups);
        }
    }

    pub fn collider_user_data(&self, handle: ColliderHandle) -> Option<u128> {
        self.collider_set.get(handle).map(|c| c.user_data)
    }

    // ── Joints ──────────────────────────────────────────────────────────

    /// Weld two bodies together. `frame1` is the pose of body 2's anchor
    /// expressed in body 1's local space; body 2's anchor is its origin.
    pub fn add_fixed_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        frame1: Isometry<Real>,
    ) -> ImpulseJointHandle {
        let joint = FixedJointBuilder::new()
            .local_frame1(frame1)
            .local_frame2(Isometry::identity());
        self.impulse_joint_set.insert(body1, body2, joint, true)
    }

    /// Ball-and-socket joint between two local anchors.
    pub fn add_spherical_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        anchor1: Vec3,
        anchor2: Vec3,
    ) -> ImpulseJointHandle {
        let joint = SphericalJointBuilder::new()
            .local_anchor1(to_point(anchor1))
            .local_anchor2(to_point(anchor2));
        self.impulse_joint_set.insert(body1, body2, joint, true)
    }

    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) {
        self.impulse_joint_set.remove(handle, true);
    }

    pub fn has_joint(&self, handle: ImpulseJointHandle) -> bool {
        self.impulse_joint_set.get(handle).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematic_toggle_round_trip() {
        let mut physics = PhysicsWorld::new();
        let body = physics.add_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        assert_eq!(physics.is_kinematic(body), Some(false));
        physics.set_kinematic(body, true);
        assert_eq!(physics.is_kinematic(body), Some(true));
        physics.set_kinematic(body, false);
        assert_eq!(physics.is_kinematic(body), Some(false));
    }

    #[test]
    fn zero_gravity_body_does_not_fall() {
        let mut physics = PhysicsWorld::new();
        let floating = physics.add_dynamic_body(Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY);
        let falling = physics.add_dynamic_body(Vec3::new(3.0, 5.0, 0.0), Quat::IDENTITY);
        physics.add_sphere_collider(floating, 0.1, CollisionLayer::Cable, 0);
        physics.add_sphere_collider(falling, 0.1, CollisionLayer::Cable, 0);
        physics.set_gravity_scale(floating, 0.0);
        for _ in 0..30 {
            physics.step(1.0 / 60.0);
        }
        let floating_y = physics.body_position(floating).unwrap().y;
        let falling_y = physics.body_position(falling).unwrap().y;
        assert!((floating_y - 5.0).abs() < 1e-4);
        assert!(falling_y < 4.9);
    }

    #[test]
    fn set_pose_moves_body() {
        let mut physics = PhysicsWorld::new();
        let body = physics.add_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        let rot = Quat::from_rotation_y(1.0);
        physics.set_body_pose(body, Vec3::new(1.0, 2.0, 3.0), rot);
        assert!((physics.body_position(body).unwrap() - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
        assert!(physics.body_rotation(body).unwrap().angle_between(rot) < 1e-4);
    }

    #[test]
    fn kinematic_body_holds_pose_across_steps() {
        let mut physics = PhysicsWorld::new();
        let body = physics.add_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        physics.add_sphere_collider(body, 0.1, CollisionLayer::Cable, 0);
        physics.zero_velocity(body);
        physics.set_kinematic(body, true);
        physics.set_body_position(body, Vec3::new(0.0, 2.0, 0.0));
        for _ in 0..60 {
            physics.step(1.0 / 60.0);
        }
        assert!((physics.body_position(body).unwrap() - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn zero_velocity_clears_motion() {
        let mut physics = PhysicsWorld::new();
        let body = physics.add_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        physics.set_linear_velocity(body, Vec3::new(1.0, 2.0, 3.0));
        physics.zero_velocity(body);
        assert_eq!(physics.linear_velocity(body), Some(Vec3::ZERO));
        assert_eq!(physics.angular_velocity(body), Some(Vec3::ZERO));
    }

    #[test]
    fn fixed_joint_insert_and_remove() {
        let mut physics = PhysicsWorld::new();
        let a = physics.add_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        let b = physics.add_dynamic_body(Vec3::X, Quat::IDENTITY);
        let joint = physics.add_fixed_joint(a, b, to_isometry(Vec3::X, Quat::IDENTITY));
        assert!(physics.has_joint(joint));
        physics.remove_joint(joint);
        assert!(!physics.has_joint(joint));
    }

    #[test]
    fn collider_layer_can_be_swapped() {
        let mut physics = PhysicsWorld::new();
        let body = physics.add_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        let collider = physics.add_sphere_collider(body, 0.1, CollisionLayer::Cable, 7);
        assert_eq!(physics.body_colliders(body), vec![collider]);
        assert_eq!(physics.collider_user_data(collider), Some(7));
        physics.set_collision_groups(collider, CollisionLayer::HeldObject.groups());
        let groups = physics.collision_groups(collider).unwrap();
        assert_eq!(CollisionLayer::of(groups), Some(CollisionLayer::HeldObject));
    }
}
