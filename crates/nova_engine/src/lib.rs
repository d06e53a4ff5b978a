//! # Nova Engine
//!
//! Core of a 3D scene editor: an entity-component scene store, a free-fly editor
//! camera, shader program management with hot recompilation, and a point-light
//! registry that keeps every lit program's uniform arrays in step with the scene.
//!
//! ## Features
//!
//! - **Sparse-set ECS**: generational entities, typed component storage, mask queries
//! - **Shader Registry**: compile, link, and recompile every program together
//! - **Light Registry**: `pointLights[i]` uniforms pushed to all registered programs
//! - **Scene Files**: JSON save/load with name-referenced meshes and textures
//! - **Headless Device**: a recording graphics device for tests and tooling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nova_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EditorConfig::default();
//!     config.init_logging();
//!     let mut ctx = EngineContext::new(config, Box::new(RecordingDevice::new()))?;
//!
//!     let cube = scene::factory::create_cube(&mut ctx)?;
//!     ctx.set_active_entity(Some(cube));
//!     ctx.render_frame((800, 600))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod assets;
pub mod render;
pub mod scene;
pub mod input;

mod application;
mod engine;

pub use application::{EditorUi, FrameLoop};
pub use engine::{EngineContext, EngineError, LightingMode};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        EditorUi, FrameLoop,
        EngineContext, EngineError, LightingMode,
        config::{Config, EditorConfig},
        foundation::{
            math::{Vec3, Mat4, Quat},
            time::{Timer, FramePacer},
        },
        ecs::{World, Entity, Component, ComponentMask},
        ecs::components::{
            Transform, MeshComponent, CameraComponent,
            LightBase, PointLight, DirectionalLight,
        },
        render::{
            GraphicsDevice, RecordingDevice, RenderError,
            EditorCamera, CameraMovement,
            Shader, ShaderPaths, ShaderRegistry,
            LightRegistry, TextureRegistry, TextureType, MeshRegistry, Vertex,
        },
        input::{InputController, WindowBackend, Key, MouseButton},
        scene,
    };
}
