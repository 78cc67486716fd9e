//! Spatial queries: raycasts for selection, sphere overlaps and closest
//! points for surface search.

use crate::physics_world::{from_vector, to_point, to_vector};
use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

fn filter_excluding(exclude: Option<RigidBodyHandle>) -> QueryFilter<'static> {
    match exclude {
        Some(body) => QueryFilter::default().exclude_rigid_body(body),
        None => QueryFilter::default(),
    }
}

impl PhysicsWorld {
    /// Cast a ray and return the first hit, optionally ignoring one body.
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(to_point(origin), to_vector(direction));

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter_excluding(exclude),
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: from_vector(&intersection.normal),
                }
            })
    }

    /// Find all colliders within a sphere, in the order the broad phase reports them.
    pub fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Vec<ColliderHandle> {
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(center.x, center.y, center.z);

        let mut results = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape,
            filter_excluding(exclude),
            |collider| {
                results.push(collider);
                true // Continue searching
            },
        );

        results
    }

    /// Closest point on a collider's boundary to `point`. A point inside a
    /// solid collider is its own closest point.
    pub fn closest_point(&self, collider: ColliderHandle, point: Vec3) -> Option<Vec3> {
        let collider = self.collider_set.get(collider)?;
        let projection = collider
            .shape()
            .project_point(collider.position(), &to_point(point), true);
        Some(Vec3::new(
            projection.point.x,
            projection.point.y,
            projection.point.z,
        ))
    }
}
