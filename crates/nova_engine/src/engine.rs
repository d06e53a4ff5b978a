//! Engine context
//!
//! One struct owns every subsystem: the scene world, resource registries,
//! shaders, lights, the editor camera and the graphics device. The UI
//! collaborator gets `&mut EngineContext` once per frame and works through the
//! accessors and entry points below.

use std::path::PathBuf;

use thiserror::Error;

use crate::assets::{ImageCrateDecoder, ImageDecoder};
use crate::config::{ConfigError, EditorConfig};
use crate::ecs::components::PointLight;
use crate::ecs::systems::{FrameStats, PassPrograms, RenderingSystem, SceneView};
use crate::ecs::{EcsError, Entity, World};
use crate::foundation::collections::{ShaderId, TextureKey};
use crate::render::{
    EditorCamera, GraphicsDevice, LightError, LightRegistry, MeshRegistry, ProgramHandle,
    RecompileReport, RenderContext, RenderError, Shader, ShaderRegistry, TextureRegistry,
    TextureType,
};
use crate::scene::{self, SceneError};

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Which program the object pass shades with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightingMode {
    /// Forward lit shading with point lights
    #[default]
    Default,
    /// Unlit textured shading
    Unlit,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ProgramIds {
    pub(crate) forward: ShaderId,
    pub(crate) unlit: ShaderId,
    pub(crate) light_source: ShaderId,
    pub(crate) highlight: ShaderId,
}

/// Owner of all editor state
pub struct EngineContext {
    pub(crate) config: EditorConfig,
    pub(crate) world: World,
    pub(crate) textures: TextureRegistry,
    pub(crate) meshes: MeshRegistry,
    pub(crate) shaders: ShaderRegistry,
    pub(crate) lights: LightRegistry,
    pub(crate) camera: EditorCamera,
    pub(crate) decoder: Box<dyn ImageDecoder>,
    pub(crate) device: Box<dyn GraphicsDevice>,
    programs: ProgramIds,
    renderer: RenderingSystem,
    active: Option<Entity>,
    lighting_mode: LightingMode,
}

impl EngineContext {
    /// Build the context and compile every program. Shader build failures are logged, not fatal.
    ///
    /// Logging is not started here; call [`EditorConfig::init_logging`] first.
    pub fn new(config: EditorConfig, device: Box<dyn GraphicsDevice>) -> Result<Self, EngineError> {
        config.validate()?;

        let mut shaders = ShaderRegistry::new();
        let programs = ProgramIds {
            forward: shaders.register(Shader::with_paths("forward", config.shaders.forward.clone())),
            unlit: shaders.register(Shader::with_paths("unlit", config.shaders.unlit.clone())),
            light_source: shaders.register(Shader::with_paths("light source", config.shaders.light_source.clone())),
            highlight: shaders.register(Shader::with_paths("highlight", config.shaders.highlight.clone())),
        };

        let mut ctx = Self {
            camera: EditorCamera::new(&config.camera),
            config,
            world: World::new(),
            textures: TextureRegistry::new(),
            meshes: MeshRegistry::new(),
            shaders,
            lights: LightRegistry::new(),
            decoder: Box::new(ImageCrateDecoder::default()),
            device,
            programs,
            renderer: RenderingSystem::new(),
            active: None,
            lighting_mode: LightingMode::Default,
        };

        ctx.recompile_shaders();
        log::info!("Engine context ready");
        Ok(ctx)
    }

    /// Builder pattern: Replace the image decoder
    pub fn with_decoder(mut self, decoder: Box<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Startup configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Scene entities
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable scene entities, for component edits
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Texture table
    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    /// Shared meshes
    pub fn meshes(&self) -> &MeshRegistry {
        &self.meshes
    }

    /// Shader programs
    pub fn shaders(&self) -> &ShaderRegistry {
        &self.shaders
    }

    /// Point-light registry
    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    /// Editor camera
    pub fn camera(&self) -> &EditorCamera {
        &self.camera
    }

    /// Mutable editor camera
    pub fn camera_mut(&mut self) -> &mut EditorCamera {
        &mut self.camera
    }

    /// Graphics device
    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    /// Mutable graphics device
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    /// Rendering system settings
    pub fn renderer_mut(&mut self) -> &mut RenderingSystem {
        &mut self.renderer
    }

    /// Currently selected entity
    pub fn active_entity(&self) -> Option<Entity> {
        self.active
    }

    /// Current lighting mode
    pub fn lighting_mode(&self) -> LightingMode {
        self.lighting_mode
    }

    /// Program the object pass binds in the current lighting mode
    pub fn active_program(&self) -> ProgramHandle {
        match self.lighting_mode {
            LightingMode::Default => self.shaders.program(self.programs.forward),
            LightingMode::Unlit => self.shaders.program(self.programs.unlit),
        }
    }

    /// Programs for each pass this frame
    pub fn pass_programs(&self) -> PassPrograms {
        PassPrograms {
            object: self.active_program(),
            highlight: self.shaders.program(self.programs.highlight),
            light_source: self.shaders.program(self.programs.light_source),
        }
    }

    /// Decode a texture chosen in a file dialog. `None` means the dialog was cancelled.
    pub fn import_texture(&mut self, name: &str, path: Option<PathBuf>, kind: TextureType) -> Option<TextureKey> {
        let Some(path) = path else {
            log::debug!("Texture import cancelled");
            return None;
        };

        if name.trim().is_empty() {
            log::warn!("Texture import from {} needs a name", path.display());
            return None;
        }

        let path = path.to_string_lossy();
        self.textures
            .load(name, &path, kind, self.decoder.as_ref(), self.device.as_mut())
    }

    /// Rename an entity
    pub fn rename_entity(&mut self, entity: Entity, name: &str) -> Result<(), EcsError> {
        self.world.set_name(entity, name)
    }

    /// Select an entity, or clear the selection. Dead handles clear it.
    pub fn set_active_entity(&mut self, entity: Option<Entity>) {
        self.active = match entity {
            Some(e) if self.world.is_alive(e) => Some(e),
            Some(e) => {
                log::warn!("Cannot select destroyed entity {e}");
                None
            }
            None => None,
        };
    }

    /// Track a point-light entity
    pub fn add_point_light(&mut self, entity: Entity) -> Result<(), LightError> {
        self.lights.add_point_light(entity, &self.world, self.device.as_mut())
    }

    /// Destroy an entity, untracking its light and releasing owned geometry
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.world.is_alive(entity) {
            return false;
        }

        if self.lights.contains(entity) {
            self.world.remove::<PointLight>(entity);
            if let Err(e) = self.lights.remove_point_light(entity, &self.world, self.device.as_mut()) {
                log::warn!("Failed to untrack light {entity}: {e}");
            }
        }

        if self.active == Some(entity) {
            self.active = None;
        }

        let despawned = self.world.despawn(entity);
        self.release_orphaned_meshes();
        despawned
    }

    /// Delete device buffers of inline meshes the world dropped
    pub fn release_orphaned_meshes(&mut self) {
        for gpu in self.world.take_orphaned_meshes() {
            self.device.delete_mesh(&gpu);
        }
    }

    /// Switch the object pass program
    pub fn set_lighting_mode(&mut self, mode: LightingMode) {
        if self.lighting_mode != mode {
            log::info!("Lighting mode set to {mode:?}");
        }
        self.lighting_mode = mode;
    }

    /// Rebuild every program and re-register the lit ones for light uniforms
    pub fn recompile_shaders(&mut self) -> RecompileReport {
        let report = self.shaders.recompile_all(self.device.as_mut());

        self.lights.clear_programs();
        let lit = self.shaders.program(self.programs.forward);
        if lit.is_valid() {
            if let Err(e) = self.lights.register_program(lit, &self.world, self.device.as_mut()) {
                log::warn!("Lit program not registered for lighting: {e}");
            }
        } else {
            log::warn!("Forward program unavailable, point lights will not be uploaded");
        }

        report
    }

    /// Write the scene to a path chosen in a file dialog. `None` is a cancelled dialog.
    pub fn save_scene(&self, path: Option<PathBuf>) -> Result<(), SceneError> {
        match path {
            Some(path) => scene::serialization::save(self, &path),
            None => {
                log::debug!("Scene save cancelled");
                Ok(())
            }
        }
    }

    /// Replace the scene with the file at a path chosen in a file dialog
    pub fn load_scene(&mut self, path: Option<PathBuf>) -> Result<(), SceneError> {
        match path {
            Some(path) => scene::serialization::load(self, &path),
            None => {
                log::debug!("Scene load cancelled");
                Ok(())
            }
        }
    }

    /// Destroy every entity and release every texture and mesh
    pub fn clear_scene(&mut self) {
        self.world.clear();
        self.release_orphaned_meshes();
        self.lights.clear_lights(&self.world, self.device.as_mut());
        self.textures.clear(self.device.as_mut());
        self.meshes.clear(self.device.as_mut());
        self.active = None;
        log::info!("Scene cleared");
    }

    /// Push lights and draw one frame
    pub fn render_frame(&mut self, framebuffer: (u32, u32)) -> Result<FrameStats, RenderError> {
        self.release_orphaned_meshes();
        self.lights.push_all(&self.world, self.device.as_mut());

        let ctx = RenderContext::from_camera(&self.camera, framebuffer);
        let programs = self.pass_programs();
        let scene = SceneView {
            world: &self.world,
            meshes: &self.meshes,
            textures: &self.textures,
        };

        self.renderer
            .render(&ctx, &scene, &programs, self.active, self.device.as_mut())
    }

    /// Release every GPU object the context owns
    pub fn shutdown(&mut self) {
        self.clear_scene();
        self.lights.clear_programs();
        self.shaders.destroy_all(self.device.as_mut());
        log::info!("Engine context shut down");
    }
}

impl Drop for EngineContext {
    fn drop(&mut self) {
        self.release_orphaned_meshes();
        if !self.shaders.is_empty() || !self.world.is_empty() {
            self.shutdown();
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use super::*;
    use crate::assets::{AssetError, DecodedImage};
    use crate::render::RecordingDevice;

    /// Decoder returning a 2x2 image for any path without "missing" in it
    pub struct SolidDecoder;

    impl ImageDecoder for SolidDecoder {
        fn decode(&self, path: &Path) -> Result<DecodedImage, AssetError> {
            if path.to_string_lossy().contains("missing") {
                return Err(AssetError::Decode {
                    path: path.display().to_string(),
                    message: "not found".to_string(),
                });
            }
            Ok(DecodedImage::solid(2, 2, [255, 255, 255, 255]))
        }
    }

    /// Context using the bundled shaders and a recording device
    pub fn context() -> EngineContext {
        EngineContext::new(EditorConfig::default(), Box::new(RecordingDevice::new()))
            .unwrap()
            .with_decoder(Box::new(SolidDecoder))
    }

    /// Downcast the context's device
    pub fn recording(ctx: &EngineContext) -> &RecordingDevice {
        ctx.device().as_any().downcast_ref::<RecordingDevice>().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::ecs::components::{MeshComponent, Transform};
    use crate::foundation::math::Vec3;
    use crate::render::mesh::cube_geometry;
    use crate::render::device::UniformValue;
    use crate::render::ShaderPaths;
    use crate::scene::factory;

    #[test]
    fn test_bundled_shaders_link() {
        let ctx = context();
        assert!(ctx.shaders().all_program_handles().iter().all(|p| p.is_valid()));
        assert_eq!(ctx.lights().programs(), &[ctx.active_program()]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EditorConfig::default();
        config.frame.target_fps = 0;
        let result = EngineContext::new(config, Box::new(crate::render::RecordingDevice::new()));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_render_default_cube() {
        let mut ctx = context();
        ctx.import_texture("Container", Some("data/container.jpg".into()), TextureType::Diffuse)
            .unwrap();
        let cube = factory::create_cube(&mut ctx).unwrap();
        assert_eq!(ctx.world().get::<MeshComponent>(cube).unwrap().textures().len(), 1);

        let stats = ctx.render_frame((800, 600)).unwrap();
        assert_eq!(stats.objects, 1);
        assert_eq!(stats.highlighted, 0);
        let draws = recording(&ctx).draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].1, 36);
    }

    #[test]
    fn test_lighting_mode_switches_program() {
        let mut ctx = context();
        let lit = ctx.active_program();
        ctx.set_lighting_mode(LightingMode::Unlit);
        assert_ne!(ctx.active_program(), lit);
        assert!(ctx.active_program().is_valid());
    }

    #[test]
    fn test_destroy_active_light_entity() {
        let mut ctx = context();
        let lamp = factory::create_light_cube(&mut ctx).unwrap();
        ctx.set_active_entity(Some(lamp));
        assert_eq!(ctx.lights().len(), 1);

        assert!(ctx.destroy_entity(lamp));
        assert_eq!(ctx.active_entity(), None);
        assert!(ctx.lights().is_empty());

        let program = ctx.active_program();
        assert_eq!(
            recording(&ctx).uniform(program, "nPointLights"),
            Some(&UniformValue::Int(0))
        );
        assert!(!ctx.destroy_entity(lamp));
    }

    #[test]
    fn test_recompile_reregisters_lit_program() {
        let mut ctx = context();
        let lamp = factory::create_light_cube(&mut ctx).unwrap();
        ctx.world_mut().get_mut::<Transform>(lamp).unwrap().position = Vec3::new(0.0, 4.0, 0.0);

        let before = ctx.active_program();
        let report = ctx.recompile_shaders();
        assert!(report.all_linked());

        let after = ctx.active_program();
        assert_ne!(before, after);
        assert_eq!(ctx.lights().programs(), &[after]);
        assert_eq!(
            recording(&ctx).uniform(after, "pointLights[0].position"),
            Some(&UniformValue::Vec3(Vec3::new(0.0, 4.0, 0.0)))
        );
    }

    #[test]
    fn test_broken_highlight_surfaces_error() {
        let mut ctx = context();
        let cube = factory::create_cube(&mut ctx).unwrap();
        ctx.set_active_entity(Some(cube));

        let id = ctx.programs.highlight;
        if let Some(shader) = ctx.shaders.get_mut(id) {
            shader.set_paths(ShaderPaths::new("missing.vert", "missing.frag"));
        }
        ctx.recompile_shaders();

        let err = ctx.render_frame((800, 600)).unwrap_err();
        assert_eq!(err, RenderError::ProgramNotLinked { pass: "highlight" });
    }

    #[test]
    fn test_import_requires_path_and_name() {
        let mut ctx = context();
        assert!(ctx.import_texture("A", None, TextureType::Diffuse).is_none());
        assert!(ctx.import_texture("  ", Some("a.png".into()), TextureType::Diffuse).is_none());
        assert!(ctx.import_texture("A", Some("missing.png".into()), TextureType::Diffuse).is_none());
        assert!(ctx.textures().is_empty());
    }

    #[test]
    fn test_select_and_rename() {
        let mut ctx = context();
        let cam = factory::create_camera(&mut ctx).unwrap();
        ctx.rename_entity(cam, "Main Camera").unwrap();
        ctx.set_active_entity(Some(cam));
        assert_eq!(ctx.world().name(cam), Some("Main Camera"));
        assert_eq!(ctx.active_entity(), Some(cam));

        ctx.destroy_entity(cam);
        ctx.set_active_entity(Some(cam));
        assert_eq!(ctx.active_entity(), None);
    }

    #[test]
    fn test_clear_scene_releases_everything() {
        let mut ctx = context();
        ctx.import_texture("Container", Some("c.png".into()), TextureType::Diffuse);
        factory::create_cube(&mut ctx).unwrap();
        factory::create_light_cube(&mut ctx).unwrap();
        ctx.clear_scene();

        assert!(ctx.world().is_empty());
        assert!(ctx.lights().is_empty());
        assert!(ctx.textures().is_empty());
        let device = recording(&ctx);
        assert_eq!(device.live_textures(), 0);
        assert_eq!(device.live_meshes(), 0);
    }

    fn spawn_inline_cube(ctx: &mut EngineContext) -> Entity {
        let geometry = cube_geometry();
        let mut mesh = MeshComponent::inline(geometry.vertices, geometry.indices);
        if let Some(geometry) = mesh.inline_geometry_mut() {
            geometry.upload(ctx.device.as_mut());
        }
        let entity = ctx.world.spawn("Imported");
        ctx.world.insert(entity, Transform::default()).unwrap();
        ctx.world.insert(entity, mesh).unwrap();
        entity
    }

    #[test]
    fn test_world_despawn_releases_inline_mesh_next_frame() {
        let mut ctx = context();
        let entity = spawn_inline_cube(&mut ctx);
        assert_eq!(recording(&ctx).live_meshes(), 1);

        ctx.world_mut().despawn(entity);
        ctx.render_frame((800, 600)).unwrap();
        assert_eq!(recording(&ctx).live_meshes(), 0);
    }

    #[test]
    fn test_destroy_entity_releases_inline_mesh() {
        let mut ctx = context();
        let entity = spawn_inline_cube(&mut ctx);
        assert!(ctx.destroy_entity(entity));
        assert_eq!(recording(&ctx).live_meshes(), 0);
    }
}
