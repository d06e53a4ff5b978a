//! Light components
//!
//! Pure data. Point lights take their world position from the entity's
//! Transform; the light registry turns them into shader uniforms.

use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec3;

/// Phong colour terms shared by every light type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightBase {
    /// Ambient colour
    pub ambient: Vec3,
    /// Diffuse colour
    pub diffuse: Vec3,
    /// Specular colour
    pub specular: Vec3,
}

impl Default for LightBase {
    fn default() -> Self {
        Self {
            ambient: Vec3::repeat(0.05),
            diffuse: Vec3::repeat(0.8),
            specular: Vec3::repeat(1.0),
        }
    }
}

/// Omnidirectional light with distance attenuation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// Colour terms
    pub base: LightBase,
    /// Constant attenuation term
    pub constant: f32,
    /// Linear attenuation term
    pub linear: f32,
    /// Quadratic attenuation term
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            base: LightBase::default(),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl PointLight {
    /// Attenuation factor at `distance`
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// Parallel light. Persisted with the scene; no render pass consumes it yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Colour terms
    pub base: LightBase,
    /// Direction the light travels
    pub direction: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            base: LightBase::default(),
            direction: Vec3::new(-0.2, -1.0, -0.3),
        }
    }
}
