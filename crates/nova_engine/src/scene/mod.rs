//! Scene presets and persistence

pub mod factory;
pub mod serialization;

pub use factory::{create_camera, create_cube, create_default_point_light, create_light_cube};
pub use serialization::SceneFile;

use thiserror::Error;

use crate::ecs::EcsError;
use crate::render::LightError;

/// Scene save/load errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not a valid scene
    #[error("Parse error: {0}")]
    Parse(String),

    /// Scene could not be encoded
    #[error("Serialize error: {0}")]
    Serialize(String),

    /// Document parsed but is inconsistent
    #[error("Invalid scene: {0}")]
    Invalid(String),

    /// Entity could not be built
    #[error("Entity error: {0}")]
    Entity(#[from] EcsError),

    /// Point light could not be registered
    #[error("Light error: {0}")]
    Light(#[from] LightError),
}
