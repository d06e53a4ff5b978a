//! Rendering layer
//!
//! Device seam, shader programs, camera, light uniforms and the resource
//! registries the render passes draw from.

pub mod device;
pub mod shader;
pub mod shader_registry;
pub mod camera;
pub mod lighting;
pub mod texture;
pub mod mesh;

pub use device::{
    DeviceCommand, GpuMesh, GraphicsDevice, ProgramHandle, RecordingDevice, ShaderStage,
    StageHandle, TextureHandle, UniformValue,
};
pub use shader::{Shader, ShaderDiagnostic, ShaderError, ShaderPaths, ShaderState};
pub use shader_registry::{RecompileOutcome, RecompileReport, ShaderRegistry};
pub use camera::{CameraMovement, EditorCamera};
pub use lighting::{LightError, LightRegistry, MAX_POINT_LIGHTS};
pub use texture::{Texture, TextureRegistry, TextureType};
pub use mesh::{Geometry, MeshRegistry, Vertex};

use thiserror::Error;

use crate::foundation::math::{Mat4, Vec3};

/// Per-frame view state shared by every pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// World to view
    pub view: Mat4,
    /// View to clip
    pub projection: Mat4,
    /// Camera world position, uploaded as `viewPos`
    pub camera_position: Vec3,
}

impl RenderContext {
    /// Snapshot the editor camera for a framebuffer of the given size
    pub fn from_camera(camera: &EditorCamera, framebuffer: (u32, u32)) -> Self {
        let (width, height) = framebuffer;
        // A minimised window reports zero height
        let aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };

        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect),
            camera_position: camera.position(),
        }
    }
}

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A pass was asked to bind a program that is not linked
    #[error("{pass} pass has no linked program")]
    ProgramNotLinked {
        /// Which pass
        pass: &'static str,
    },
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_context_matches_camera() {
        let camera = EditorCamera::default();
        let ctx = RenderContext::from_camera(&camera, (800, 600));
        assert_relative_eq!(ctx.view, camera.view_matrix());
        assert_relative_eq!(ctx.projection, camera.projection_matrix(800.0 / 600.0));
        assert_relative_eq!(ctx.camera_position, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_zero_height_framebuffer() {
        let ctx = RenderContext::from_camera(&EditorCamera::default(), (800, 0));
        assert!(ctx.projection.iter().all(|v| v.is_finite()));
    }
}
