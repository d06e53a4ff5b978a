//! Camera component

use serde::{Serialize, Deserialize};

use crate::foundation::math::{self, Mat4};

/// Projection properties. Scene cameras are data only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraComponent {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraComponent {
    /// Perspective matrix for the given aspect ratio
    pub fn projection(&self, aspect: f32) -> Mat4 {
        math::make_perspective(aspect, math::utils::deg_to_rad(self.fov), self.near, self.far)
    }
}
