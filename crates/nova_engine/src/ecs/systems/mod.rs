//! ECS Systems module

pub mod rendering;

pub use rendering::{FrameStats, PassPrograms, RenderingSystem, SceneView};
