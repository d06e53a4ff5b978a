//! Transform component
//!
//! Rotation is stored as Euler angles in degrees (x = pitch, y = yaw, z = roll)
//! so the editor UI can edit it directly.

use serde::{Serialize, Deserialize};

use crate::foundation::math::{self, Mat4, Quat, Vec3};

/// Position, Euler rotation and scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World space position
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    /// Per-axis scale; negative values are allowed
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set rotation in degrees
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation as a unit quaternion
    pub fn orientation(&self) -> Quat {
        math::rotate_from_euler(self.rotation, false)
    }

    /// Model matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        math::model_matrix(&self.position, &self.rotation, &self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_matrix_is_identity() {
        assert_relative_eq!(Transform::default().to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_translation_column() {
        let m = Transform::from_position(Vec3::new(4.0, -1.0, 2.0))
            .with_scale(Vec3::new(3.0, 3.0, 3.0))
            .to_matrix();
        assert_relative_eq!(m[(0, 3)], 4.0);
        assert_relative_eq!(m[(1, 3)], -1.0);
        assert_relative_eq!(m[(2, 3)], 2.0);
        assert_relative_eq!(m[(0, 0)], 3.0);
    }
}
