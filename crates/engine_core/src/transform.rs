//! Transform component and utilities for spatial positioning.

use glam::{Mat3, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
///
/// For physics-driven entities the rigid body is authoritative for position
/// and rotation; the transform is re-synced after every step. Scale is never
/// touched by physics and doubles as the segment size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Replace the scale, builder style.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Rotate so that forward points at `target`. Does nothing when the
    /// target coincides with the position or lies along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        let right = forward.cross(up).normalize_or_zero();
        if right == Vec3::ZERO {
            return;
        }
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
    }

    /// Half of the X scale; the resting offset used when a body sits on a surface.
    pub fn half_extent(&self) -> f32 {
        self.scale.x * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn half_extent_uses_x_scale() {
        let t = Transform::from_position(Vec3::ONE).with_scale(Vec3::new(0.2, 1.0, 3.0));
        assert!((t.half_extent() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn directions_follow_rotation() {
        let t = Transform::from_position_rotation(
            Vec3::ZERO,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        assert!((t.forward() - -Vec3::X).length() < 1e-5);
        assert!((t.up() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transform::from_position(Vec3::new(0.0, 1.0, 5.0));
        t.look_at(Vec3::new(3.0, 1.0, 1.0), Vec3::Y);
        assert!((t.forward() - Vec3::new(0.6, 0.0, -0.8)).length() < 1e-5);

        let before = t.rotation;
        t.look_at(t.position + Vec3::Y, Vec3::Y);
        assert_eq!(t.rotation, before);
    }
}
