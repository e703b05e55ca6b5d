//! Transform matrix utilities for physics bodies
//!
//! This module converts between the engine representation of a body pose
//! (translation + quaternion) and the 4x4 homogeneous matrices consumed by the
//! renderer and the interaction code.

use glam::{Mat4, Quat, Vec3};

/// Build the world matrix of a uniformly scaled body.
///
/// The scale is applied in body space, so the matrix maps mesh-space
/// vertices straight into world space.
#[must_use]
pub fn body_matrix(position: Vec3, rotation: Quat, scale: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, position)
}

/// Inverse-transpose of a world matrix, used to carry normals into world space.
#[must_use]
pub fn normal_matrix(world: Mat4) -> Mat4 {
    world.inverse().transpose()
}

/// Map a world-space point into the local frame described by `world`.
#[must_use]
pub fn world_to_local(world: Mat4, point: Vec3) -> Vec3 {
    world.inverse().transform_point3(point)
}

/// World-space origin of a body matrix.
#[must_use]
pub fn translation_of(world: Mat4) -> Vec3 {
    world.w_axis.truncate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let transform = body_matrix(Vec3::ZERO, Quat::IDENTITY, 1.0);
        assert_eq!(transform, Mat4::IDENTITY);
    }

    #[test]
    fn test_translation_only() {
        let transform = body_matrix(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, 1.0);
        assert_eq!(transform.to_cols_array_2d()[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_world_to_local_undoes_scale_and_rotation() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let world = body_matrix(Vec3::new(0.0, 5.0, 0.0), rotation, 2.0);
        let local = Vec3::new(0.25, -0.5, 0.1);
        let round_trip = world_to_local(world, world.transform_point3(local));
        assert!((round_trip - local).length() < 1e-5, "{round_trip:?}");
    }

    #[test]
    fn test_normal_matrix_keeps_normals_perpendicular_under_scale() {
        let world = Mat4::from_scale(Vec3::new(1.0, 4.0, 1.0));
        let n = normal_matrix(world).transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        // tangent (1, -1, 0) becomes (1, -4, 0) in world space
        let tangent = world.transform_vector3(Vec3::new(1.0, -1.0, 0.0));
        assert!(n.dot(tangent).abs() < 1e-5);
    }
}
