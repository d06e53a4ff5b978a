//! # Editor Configuration
//!
//! Settings read once at startup: window size, frame pacing, shader source
//! locations for each program the editor builds, camera defaults, and log level.

use serde::{Serialize, Deserialize};

use super::{Config, ConfigError};
use crate::foundation::logging;
use crate::render::shader::ShaderPaths;

/// Window settings handed to the windowing collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Initial width in pixels
    pub width: u32,
    /// Initial height in pixels
    pub height: u32,
    /// Title bar text
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Nova Editor".to_string(),
        }
    }
}

/// Frame loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    /// Frames per second the loop paces itself to
    pub target_fps: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self { target_fps: 60 }
    }
}

/// Source locations for every program the editor compiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSet {
    /// Lit forward program used in the default lighting mode
    pub forward: ShaderPaths,
    /// Unlit program used in the unlit lighting mode
    pub unlit: ShaderPaths,
    /// Flat-colour program for visible light sources
    pub light_source: ShaderPaths,
    /// Outline program for the selected object
    pub highlight: ShaderPaths,
}

impl Default for ShaderSet {
    fn default() -> Self {
        Self {
            forward: ShaderPaths::new("shaders/forward.vert", "shaders/forward.frag"),
            unlit: ShaderPaths::new("shaders/unlit.vert", "shaders/unlit.frag"),
            light_source: ShaderPaths::new("shaders/light_source.vert", "shaders/light_source.frag"),
            highlight: ShaderPaths::with_geometry(
                "shaders/outline.vert",
                "shaders/outline.geom",
                "shaders/outline.frag",
            ),
        }
    }
}

/// Editor camera defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Units per second
    pub move_speed: f32,
    /// Degrees per pixel of cursor travel
    pub sensitivity: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            sensitivity: 0.1,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Top-level editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Window settings
    pub window: WindowSettings,
    /// Frame pacing
    pub frame: FrameSettings,
    /// Shader sources
    pub shaders: ShaderSet,
    /// Camera defaults
    pub camera: CameraSettings,
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            frame: FrameSettings::default(),
            shaders: ShaderSet::default(),
            camera: CameraSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config for EditorConfig {}

impl EditorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".to_string()));
        }

        if self.frame.target_fps == 0 {
            return Err(ConfigError::Invalid("target fps must be at least 1".to_string()));
        }

        let camera = &self.camera;
        if camera.near <= 0.0 || camera.far <= 0.0 {
            return Err(ConfigError::Invalid("clip planes must be positive".to_string()));
        }
        if camera.near >= camera.far {
            return Err(ConfigError::Invalid(format!(
                "near plane {} must be closer than far plane {}",
                camera.near, camera.far
            )));
        }
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(ConfigError::Invalid(format!("field of view {} out of range", camera.fov)));
        }

        Ok(())
    }

    /// Start the logger at `log_level` unless `RUST_LOG` overrides it
    pub fn init_logging(&self) {
        logging::init(&self.log_level);
    }
}
