//! # Rendering System
//!
//! Three passes over the scene, all sharing one [`RenderContext`] per frame:
//!
//! 1. **Objects**: every entity with Transform + Mesh and no light component,
//!    drawn with the active shading program and its textures bound in list order.
//! 2. **Highlight**: the active entity drawn again with the outline program.
//! 3. **Point lights**: every Transform + Mesh + PointLight entity drawn flat in
//!    its diffuse colour.
//!
//! A pass whose program is not linked issues no commands and returns
//! [`RenderError::ProgramNotLinked`]. A frame still runs the remaining passes
//! and reports the first failure.

use crate::ecs::components::{MeshComponent, PointLight, Transform};
use crate::ecs::{ComponentMask, Entity, World};
use crate::render::device::{GraphicsDevice, ProgramHandle, UniformValue};
use crate::render::{MeshRegistry, RenderContext, RenderError, RenderResult, TextureRegistry};

/// Scene state a frame is drawn from
pub struct SceneView<'a> {
    /// Entities and components
    pub world: &'a World,
    /// Shared geometry
    pub meshes: &'a MeshRegistry,
    /// Texture table
    pub textures: &'a TextureRegistry,
}

/// Programs bound by each pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassPrograms {
    /// Object pass (lit or unlit depending on lighting mode)
    pub object: ProgramHandle,
    /// Active-object outline
    pub highlight: ProgramHandle,
    /// Light source cubes
    pub light_source: ProgramHandle,
}

/// Draw calls issued by one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Object pass draws
    pub objects: usize,
    /// 1 when the active entity was outlined
    pub highlighted: usize,
    /// Light source draws
    pub lights: usize,
}

/// System running the scene render passes
pub struct RenderingSystem {
    enabled: bool,
    clear_color: [f32; 4],
}

impl Default for RenderingSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn require_linked(program: ProgramHandle, pass: &'static str) -> RenderResult<()> {
    if program.is_valid() {
        Ok(())
    } else {
        log::trace!("{pass} pass skipped, program not linked");
        Err(RenderError::ProgramNotLinked { pass })
    }
}

fn settle<T: Default>(result: RenderResult<T>, first_error: &mut Option<RenderError>) -> T {
    result.unwrap_or_else(|e| {
        match first_error {
            Some(_) => log::warn!("{e}"),
            None => *first_error = Some(e),
        }
        T::default()
    })
}

/// Vertex array and index count to draw for a mesh, `None` when nothing can be drawn
fn resolve_draw(entity: Entity, mesh: &MeshComponent, meshes: &MeshRegistry) -> Option<(u32, u32)> {
    let geometry = match mesh {
        MeshComponent::Inline { geometry, .. } => geometry,
        MeshComponent::Shared { mesh: key, .. } => match meshes.get(*key) {
            Some(entry) => &entry.geometry,
            None => {
                log::warn!("Entity {entity} references a mesh that no longer exists");
                return None;
            }
        },
    };

    let gpu = geometry.gpu()?;
    (gpu.index_count > 0).then_some((gpu.vao, gpu.index_count))
}

fn upload_camera(device: &mut dyn GraphicsDevice, program: ProgramHandle, ctx: &RenderContext) {
    device.set_uniform(program, "view", UniformValue::Mat4(ctx.view));
    device.set_uniform(program, "proj", UniformValue::Mat4(ctx.projection));
}

impl RenderingSystem {
    /// Create a new rendering system
    pub fn new() -> Self {
        Self {
            enabled: true,
            clear_color: [0.1, 0.1, 0.1, 1.0],
        }
    }

    /// Enable or disable the rendering system
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if the system is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the framebuffer clear colour
    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    /// Clear and run every pass. The first failing pass aborts the frame.
    pub fn render(
        &self,
        ctx: &RenderContext,
        scene: &SceneView<'_>,
        programs: &PassPrograms,
        active: Option<Entity>,
        device: &mut dyn GraphicsDevice,
    ) -> RenderResult<FrameStats> {
        if !self.enabled {
            return Ok(FrameStats::default());
        }

        device.clear(self.clear_color);

        // A failing pass does not skip the ones after it
        let mut first_error = None;
        let objects = settle(self.object_pass(ctx, scene, programs.object, device), &mut first_error);
        let highlighted = usize::from(settle(
            self.highlight_pass(ctx, scene, programs.highlight, active, device),
            &mut first_error,
        ));
        let lights = settle(
            self.point_light_pass(ctx, scene, programs.light_source, device),
            &mut first_error,
        );

        log::trace!("Frame drew {objects} objects and {lights} lights");
        match first_error {
            Some(e) => Err(e),
            None => Ok(FrameStats { objects, highlighted, lights }),
        }
    }

    /// Draw every non-light object. Returns the number of draws.
    pub fn object_pass(
        &self,
        ctx: &RenderContext,
        scene: &SceneView<'_>,
        program: ProgramHandle,
        device: &mut dyn GraphicsDevice,
    ) -> RenderResult<usize> {
        require_linked(program, "object")?;

        device.use_program(program);
        upload_camera(device, program, ctx);
        device.set_uniform(program, "viewPos", UniformValue::Vec3(ctx.camera_position));

        let entities = scene.world.query(
            ComponentMask::TRANSFORM | ComponentMask::MESH,
            ComponentMask::POINT_LIGHT | ComponentMask::DIRECTIONAL_LIGHT,
        );

        let mut draws = 0;
        for entity in entities {
            let (Some(transform), Some(mesh)) = (
                scene.world.get::<Transform>(entity),
                scene.world.get::<MeshComponent>(entity),
            ) else {
                continue;
            };

            let Some((vao, index_count)) = resolve_draw(entity, mesh, scene.meshes) else {
                continue;
            };

            device.set_uniform(program, "model", UniformValue::Mat4(transform.to_matrix()));

            for (unit, key) in (0u32..).zip(mesh.textures()) {
                if let Some(texture) = scene.textures.get(*key) {
                    device.bind_texture(unit, texture.handle);
                }
            }

            device.draw_indexed(vao, index_count);
            draws += 1;
        }

        Ok(draws)
    }

    /// Draw the active entity again with the outline program. Returns whether it drew.
    pub fn highlight_pass(
        &self,
        ctx: &RenderContext,
        scene: &SceneView<'_>,
        program: ProgramHandle,
        active: Option<Entity>,
        device: &mut dyn GraphicsDevice,
    ) -> RenderResult<bool> {
        let Some(entity) = active.filter(|e| scene.world.is_alive(*e)) else {
            return Ok(false);
        };

        let (Some(transform), Some(mesh)) = (
            scene.world.get::<Transform>(entity),
            scene.world.get::<MeshComponent>(entity),
        ) else {
            return Ok(false);
        };

        let Some((vao, index_count)) = resolve_draw(entity, mesh, scene.meshes) else {
            return Ok(false);
        };

        require_linked(program, "highlight")?;

        device.use_program(program);
        device.set_uniform(program, "model", UniformValue::Mat4(transform.to_matrix()));
        upload_camera(device, program, ctx);
        device.draw_indexed(vao, index_count);
        Ok(true)
    }

    /// Draw a flat-coloured mesh at every point light. Returns the number of draws.
    pub fn point_light_pass(
        &self,
        ctx: &RenderContext,
        scene: &SceneView<'_>,
        program: ProgramHandle,
        device: &mut dyn GraphicsDevice,
    ) -> RenderResult<usize> {
        require_linked(program, "point light")?;

        device.use_program(program);
        upload_camera(device, program, ctx);

        let entities = scene.world.query(
            ComponentMask::TRANSFORM | ComponentMask::MESH | ComponentMask::POINT_LIGHT,
            ComponentMask::empty(),
        );

        let mut draws = 0;
        for entity in entities {
            let (Some(transform), Some(mesh), Some(light)) = (
                scene.world.get::<Transform>(entity),
                scene.world.get::<MeshComponent>(entity),
                scene.world.get::<PointLight>(entity),
            ) else {
                continue;
            };

            let Some((vao, index_count)) = resolve_draw(entity, mesh, scene.meshes) else {
                continue;
            };

            device.set_uniform(program, "model", UniformValue::Mat4(transform.to_matrix()));
            device.set_uniform(program, "lightColor", UniformValue::Vec3(light.base.diffuse));
            device.draw_indexed(vao, index_count);
            draws += 1;
        }

        Ok(draws)
    }
}
