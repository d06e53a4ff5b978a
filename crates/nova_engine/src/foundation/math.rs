//! Math utilities and types
//!
//! Provides the fixed transform conventions used by the editor: Euler angles in
//! degrees (pitch, yaw, roll), a right-handed look-at view matrix, and an
//! OpenGL-style perspective projection mapping view depth onto `[-1, 1]`.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

/// Convert pitch/yaw/roll (x, y, z) into a unit quaternion.
///
/// Angles are degrees unless `is_radians` is set. The composition uses the
/// half-angle product formula below and nothing else; swapping the order changes
/// how multi-axis rotations look in the editor.
pub fn rotate_from_euler(angles: Vec3, is_radians: bool) -> Quat {
    let angles = if is_radians { angles } else { angles * constants::DEG_TO_RAD };

    let (sin_pitch, cos_pitch) = (angles.x * 0.5).sin_cos();
    let (sin_yaw, cos_yaw) = (angles.y * 0.5).sin_cos();
    let (sin_roll, cos_roll) = (angles.z * 0.5).sin_cos();

    let x = sin_pitch * cos_yaw * cos_roll - cos_pitch * sin_yaw * sin_roll;
    let y = cos_pitch * sin_yaw * cos_roll + sin_pitch * cos_yaw * sin_roll;
    let z = cos_pitch * cos_yaw * sin_roll - sin_pitch * sin_yaw * cos_roll;
    let w = cos_pitch * cos_yaw * cos_roll + sin_pitch * sin_yaw * sin_roll;

    Quat::new_normalize(Quaternion::new(w, x, y, z))
}

/// Build a right-handed view matrix looking from `eye` towards `target`.
///
/// `forward` points from the target back to the eye, so the camera looks down its
/// local -Z axis. A `world_up` parallel to the view direction is not guarded.
pub fn look_at(eye: Vec3, target: Vec3, world_up: Vec3) -> Mat4 {
    let forward = (eye - target).normalize();
    let right = world_up.cross(&forward).normalize();
    let up = forward.cross(&right);

    Mat4::new(
        right.x, right.y, right.z, -right.dot(&eye),
        up.x, up.y, up.z, -up.dot(&eye),
        forward.x, forward.y, forward.z, -forward.dot(&eye),
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Symmetric perspective projection.
///
/// `fov` must already be in radians. View-space depth `-near` maps to NDC `-1`
/// and `-far` maps to `+1`.
pub fn make_perspective(aspect: f32, fov: f32, near: f32, far: f32) -> Mat4 {
    let focal = 1.0 / (fov * 0.5).tan();
    let inverse_depth = 1.0 / (far - near);

    Mat4::new(
        focal / aspect, 0.0, 0.0, 0.0,
        0.0, focal, 0.0, 0.0,
        0.0, 0.0, -(far + near) * inverse_depth, -(2.0 * far * near) * inverse_depth,
        0.0, 0.0, -1.0, 0.0,
    )
}

/// Model matrix in TRS order: translate, then rotate from Euler degrees, then scale.
pub fn model_matrix(position: &Vec3, rotation: &Vec3, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * rotate_from_euler(*rotation, false).to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn project_depth(proj: &Mat4, view_z: f32) -> f32 {
        let clip = proj * Vec4::new(0.0, 0.0, view_z, 1.0);
        clip.z / clip.w
    }

    #[test]
    fn test_euler_quaternion_is_unit() {
        let samples = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(90.0, 0.0, 0.0),
            Vec3::new(-45.0, 30.0, 170.0),
            Vec3::new(359.0, -720.0, 12.5),
            Vec3::new(1e4, -3.3, 0.001),
        ];

        for angles in samples {
            let q = rotate_from_euler(angles, false);
            assert_relative_eq!(q.quaternion().norm(), 1.0, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_zero_euler_is_identity() {
        let q = rotate_from_euler(Vec3::zeros(), false);
        assert_relative_eq!(q, Quat::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_radian_flag_skips_conversion() {
        let degrees = rotate_from_euler(Vec3::new(0.0, 90.0, 0.0), false);
        let radians = rotate_from_euler(Vec3::new(0.0, constants::PI / 2.0, 0.0), true);
        assert_relative_eq!(degrees, radians, epsilon = EPSILON);
    }

    #[test]
    fn test_single_axis_rotations() {
        // Pure yaw of 90 degrees turns +X into -Z in a right-handed Y-up frame
        let yaw = rotate_from_euler(Vec3::new(0.0, 90.0, 0.0), false);
        assert_relative_eq!(yaw * Vec3::x(), -Vec3::z(), epsilon = EPSILON);

        // Pure pitch of 90 degrees turns +Y into +Z
        let pitch = rotate_from_euler(Vec3::new(90.0, 0.0, 0.0), false);
        assert_relative_eq!(pitch * Vec3::y(), Vec3::z(), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_maps_eye_to_origin() {
        let eye = Vec3::new(3.0, -2.0, 7.5);
        let forward = Vec3::new(0.3, 0.1, -1.0).normalize();
        let view = look_at(eye, eye + forward, Vec3::y());

        let mapped = view.transform_point(&eye.into());
        assert_relative_eq!(mapped.coords, Vec3::zeros(), epsilon = EPSILON);

        // The viewing direction lands on -Z
        let ahead = view.transform_vector(&forward);
        assert_relative_eq!(ahead, -Vec3::z(), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_basis_is_orthonormal() {
        let view = look_at(Vec3::new(0.0, 2.0, 5.0), Vec3::zeros(), Vec3::y());
        let rotation = view.fixed_view::<3, 3>(0, 0).into_owned();
        let identity = rotation * rotation.transpose();
        assert_relative_eq!(identity, Matrix3::identity(), epsilon = EPSILON);
        assert_relative_eq!(rotation.determinant(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_perspective_depth_mapping() {
        let (near, far) = (0.1, 100.0);
        let proj = make_perspective(800.0 / 600.0, utils::deg_to_rad(45.0), near, far);

        assert_relative_eq!(project_depth(&proj, -near), -1.0, epsilon = 1e-4);
        assert_relative_eq!(project_depth(&proj, -far), 1.0, epsilon = 1e-4);

        assert_relative_eq!(proj[(2, 2)], -(far + near) / (far - near), epsilon = EPSILON);
        assert_relative_eq!(proj[(2, 3)], -(2.0 * far * near) / (far - near), epsilon = EPSILON);
        assert_relative_eq!(proj[(3, 2)], -1.0);
    }

    #[test]
    fn test_perspective_vertical_scale() {
        let proj = make_perspective(2.0, constants::PI / 2.0, 1.0, 10.0);
        assert_relative_eq!(proj[(1, 1)], 1.0, epsilon = EPSILON);
        assert_relative_eq!(proj[(0, 0)], 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_model_matrix_trs_order() {
        let model = model_matrix(
            &Vec3::new(1.0, 2.0, 3.0),
            &Vec3::new(0.0, 90.0, 0.0),
            &Vec3::new(2.0, 2.0, 2.0),
        );

        // Scale first, then yaw +X onto -Z, then translate
        let point = model.transform_point(&Vec3::x().into());
        assert_relative_eq!(point.coords, Vec3::new(1.0, 2.0, 1.0), epsilon = EPSILON);
    }
}
