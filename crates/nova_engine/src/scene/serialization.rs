//! JSON scene files
//!
//! A scene file lists the shared meshes and textures by name and path, then
//! every entity with whichever components it carries. Entities refer to meshes
//! and textures by name, so a file stays valid across sessions even though
//! registry keys do not.
//!
//! Loading parses and validates the whole document before touching the live
//! scene. Only then is the scene cleared and rebuilt.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::SceneError;
use crate::ecs::components::{CameraComponent, DirectionalLight, MeshComponent, PointLight, Transform};
use crate::ecs::{EcsError, Entity};
use crate::engine::EngineContext;
use crate::render::{TextureType, MAX_POINT_LIGHTS};

/// Shared mesh entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Registry name
    pub name: String,
    /// `builtin:` primitive or OBJ file
    pub path: String,
}

/// Texture entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRecord {
    /// Unique display name
    pub name: String,
    /// Image file
    pub path: String,
    /// Semantic role
    #[serde(rename = "type")]
    pub kind: TextureType,
}

/// Reference to a registry entry by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRef {
    /// Referenced name
    pub name: String,
}

/// Mesh attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMesh {
    /// Shared mesh name
    pub name: String,
    /// Textures in unit order
    #[serde(default)]
    pub textures: Vec<NameRef>,
}

/// One entity and its components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Display name
    pub name: String,
    /// Placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    /// Shared mesh and textures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<EntityMesh>,
    /// Scene camera properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraComponent>,
    /// Point light, re-registered on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_light: Option<PointLight>,
    /// Directional light
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directional_light: Option<DirectionalLight>,
}

/// Whole scene document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    /// Shared meshes
    #[serde(default)]
    pub meshes: Vec<MeshRecord>,
    /// Textures
    #[serde(default)]
    pub textures: Vec<TextureRecord>,
    /// Entities in index order
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

impl SceneFile {
    /// Snapshot the live scene
    pub fn capture(ctx: &EngineContext) -> Self {
        let meshes = ctx
            .meshes
            .iter()
            .map(|(_, entry)| MeshRecord {
                name: entry.name.clone(),
                path: entry.path.clone(),
            })
            .collect();

        let textures = ctx
            .textures
            .iter()
            .map(|(_, texture)| TextureRecord {
                name: texture.name.clone(),
                path: texture.path.clone(),
                kind: texture.kind,
            })
            .collect();

        let entities = ctx
            .world
            .entities()
            .map(|(entity, name)| capture_entity(ctx, entity, name))
            .collect();

        Self { meshes, textures, entities }
    }

    /// Parse a document
    pub fn from_json(source: &str) -> Result<Self, SceneError> {
        let scene: Self = serde_json::from_str(source).map_err(|e| SceneError::Parse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Encode as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SceneError> {
        serde_json::to_string_pretty(self).map_err(|e| SceneError::Serialize(e.to_string()))
    }

    /// Reject duplicate names, empty entity names and more point lights than can be tracked
    pub fn validate(&self) -> Result<(), SceneError> {
        let mut seen = HashSet::new();
        for mesh in &self.meshes {
            if !seen.insert(mesh.name.as_str()) {
                return Err(SceneError::Invalid(format!("duplicate mesh '{}'", mesh.name)));
            }
        }

        seen.clear();
        for texture in &self.textures {
            if !seen.insert(texture.name.as_str()) {
                return Err(SceneError::Invalid(format!("duplicate texture '{}'", texture.name)));
            }
        }

        if let Some(index) = self.entities.iter().position(|e| e.name.is_empty()) {
            return Err(SceneError::Invalid(format!("entity {index} has an empty name")));
        }

        let lights = self.entities.iter().filter(|e| e.point_light.is_some()).count();
        if lights > MAX_POINT_LIGHTS {
            return Err(SceneError::Invalid(format!(
                "{lights} point lights, at most {MAX_POINT_LIGHTS} supported"
            )));
        }

        Ok(())
    }

    /// Replace the live scene with this document
    pub fn apply(&self, ctx: &mut EngineContext) -> Result<(), SceneError> {
        ctx.clear_scene();

        for mesh in &self.meshes {
            ctx.meshes.load(&mesh.name, &mesh.path, ctx.device.as_mut());
        }

        for texture in &self.textures {
            ctx.textures.load(
                &texture.name,
                &texture.path,
                texture.kind,
                ctx.decoder.as_ref(),
                ctx.device.as_mut(),
            );
        }

        for record in &self.entities {
            let entity = rebuild_entity(ctx, record)?;
            if record.point_light.is_some() {
                if let Err(e) = ctx.add_point_light(entity) {
                    log::warn!("Point light '{}' not registered: {e}", record.name);
                }
            }
        }

        log::info!(
            "Scene loaded: {} entities, {} meshes, {} textures",
            ctx.world.len(),
            ctx.meshes.len(),
            ctx.textures.len()
        );
        Ok(())
    }
}

fn capture_entity(ctx: &EngineContext, entity: Entity, name: &str) -> EntityRecord {
    let world = &ctx.world;

    let mesh = world.get::<MeshComponent>(entity).and_then(|mesh| match mesh.mesh_key() {
        Some(key) => match ctx.meshes.get(key) {
            Some(entry) => Some(EntityMesh {
                name: entry.name.clone(),
                textures: mesh
                    .textures()
                    .iter()
                    .filter_map(|key| ctx.textures.get(*key))
                    .map(|texture| NameRef { name: texture.name.clone() })
                    .collect(),
            }),
            None => {
                log::warn!("Entity '{name}' references a released mesh, not saved");
                None
            }
        },
        None => {
            log::warn!("Entity '{name}' has inline geometry, mesh not saved");
            None
        }
    });

    EntityRecord {
        name: name.to_string(),
        transform: world.get::<Transform>(entity).cloned(),
        mesh,
        camera: world.get::<CameraComponent>(entity).copied(),
        point_light: world.get::<PointLight>(entity).copied(),
        directional_light: world.get::<DirectionalLight>(entity).copied(),
    }
}

fn rebuild_entity(ctx: &mut EngineContext, record: &EntityRecord) -> Result<Entity, EcsError> {
    let world = &mut ctx.world;
    let entity = world.spawn(&record.name);

    if let Some(transform) = &record.transform {
        world.insert(entity, transform.clone())?;
    }
    if let Some(camera) = record.camera {
        world.insert(entity, camera)?;
    }
    if let Some(light) = record.point_light {
        world.insert(entity, light)?;
    }
    if let Some(light) = record.directional_light {
        world.insert(entity, light)?;
    }

    if let Some(mesh) = &record.mesh {
        match ctx.meshes.find(&mesh.name) {
            Some(key) => {
                let textures = mesh
                    .textures
                    .iter()
                    .filter_map(|t| ctx.textures.find(&t.name))
                    .collect();
                ctx.world.insert(entity, MeshComponent::shared(key).with_textures(textures))?;
            }
            None => log::warn!("Entity '{}' references missing mesh '{}'", record.name, mesh.name),
        }
    }

    Ok(entity)
}

/// Write the live scene to `path`
pub fn save(ctx: &EngineContext, path: &Path) -> Result<(), SceneError> {
    let json = SceneFile::capture(ctx).to_json()?;
    std::fs::write(path, json)?;
    log::info!("Scene saved to {}", path.display());
    Ok(())
}

/// Replace the live scene with the file at `path`. The scene is untouched on error.
pub fn load(ctx: &mut EngineContext, path: &Path) -> Result<(), SceneError> {
    let source = std::fs::read_to_string(path)?;
    let scene = SceneFile::from_json(&source).map_err(|e| {
        log::error!("Failed to load scene {}: {e}", path.display());
        e
    })?;
    scene.apply(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::context;
    use crate::foundation::math::Vec3;
    use crate::render::mesh::BUILTIN_CUBE;
    use crate::scene::factory;
    use approx::assert_relative_eq;

    fn temp_scene(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("nova_scene_{}_{tag}.json", std::process::id()))
    }

    fn populate(ctx: &mut EngineContext) {
        ctx.import_texture("Container", Some("container.jpg".into()), TextureType::Diffuse)
            .unwrap();

        let cube = factory::create_cube(ctx).unwrap();
        *ctx.world_mut().get_mut::<Transform>(cube).unwrap() = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Vec3::new(10.0, 20.0, 30.0))
            .with_scale(Vec3::new(2.0, 0.5, 1.0));

        let cam = factory::create_camera(ctx).unwrap();
        ctx.world_mut().get_mut::<Transform>(cam).unwrap().position = Vec3::new(0.0, 1.0, 5.0);
        ctx.world_mut().get_mut::<CameraComponent>(cam).unwrap().fov = 60.0;

        let lamp = factory::create_light_cube(ctx).unwrap();
        ctx.rename_entity(lamp, "Lamp").unwrap();
    }

    fn assert_transform(world: &crate::ecs::World, entity: Entity, position: Vec3, rotation: Vec3, scale: Vec3) {
        let transform = world.get::<Transform>(entity).unwrap();
        assert_relative_eq!(transform.position, position);
        assert_relative_eq!(transform.rotation, rotation);
        assert_relative_eq!(transform.scale, scale);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut ctx = context();
        populate(&mut ctx);
        let path = temp_scene("round_trip");
        ctx.save_scene(Some(path.clone())).unwrap();

        let mut restored = context();
        restored.load_scene(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        let world = restored.world();
        assert_eq!(world.len(), 3);

        let cube = world.find_by_name("Cube").unwrap();
        assert_transform(
            world,
            cube,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(10.0, 20.0, 30.0),
            Vec3::new(2.0, 0.5, 1.0),
        );
        let mesh = world.get::<MeshComponent>(cube).unwrap();
        assert_eq!(restored.meshes().get(mesh.mesh_key().unwrap()).unwrap().path, BUILTIN_CUBE);
        assert_eq!(restored.textures().get(mesh.textures()[0]).unwrap().name, "Container");

        let cam = world.find_by_name("Camera").unwrap();
        assert_transform(world, cam, Vec3::new(0.0, 1.0, 5.0), Vec3::zeros(), Vec3::repeat(1.0));
        assert_relative_eq!(world.get::<CameraComponent>(cam).unwrap().fov, 60.0);

        let lamp = world.find_by_name("Lamp").unwrap();
        assert_transform(world, lamp, Vec3::new(1.2, 1.0, 2.0), Vec3::zeros(), Vec3::repeat(0.2));
        assert_eq!(restored.lights().lights(), &[lamp]);
        assert!(world.get::<MeshComponent>(lamp).unwrap().textures().is_empty());
    }

    #[test]
    fn test_parse_error_leaves_scene_untouched() {
        let mut ctx = context();
        populate(&mut ctx);
        let path = temp_scene("broken");
        std::fs::write(&path, "{ \"entities\": [ { \"name\": ").unwrap();

        let result = ctx.load_scene(Some(path.clone()));
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(SceneError::Parse(_))));
        assert_eq!(ctx.world().len(), 3);
        assert_eq!(ctx.lights().len(), 1);
    }

    #[test]
    fn test_duplicate_texture_names_rejected() {
        let source = r#"{
            "textures": [
                {"name": "A", "path": "a.png", "type": "diffuse"},
                {"name": "A", "path": "b.png", "type": "specular"}
            ]
        }"#;
        assert!(matches!(SceneFile::from_json(source), Err(SceneError::Invalid(_))));
    }

    #[test]
    fn test_too_many_point_lights_rejected() {
        let entities = (0..MAX_POINT_LIGHTS + 2)
            .map(|i| EntityRecord {
                name: format!("Light {i}"),
                transform: Some(Transform::default()),
                mesh: None,
                camera: None,
                point_light: Some(PointLight::default()),
                directional_light: None,
            })
            .collect();
        let source = SceneFile { entities, ..Default::default() }.to_json().unwrap();

        let mut ctx = context();
        populate(&mut ctx);
        let path = temp_scene("too_many_lights");
        std::fs::write(&path, source).unwrap();

        let result = ctx.load_scene(Some(path.clone()));
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(SceneError::Invalid(_))));
        assert_eq!(ctx.world().len(), 3);
        assert_eq!(ctx.lights().len(), 1);
    }

    #[test]
    fn test_missing_references_skipped() {
        let source = r#"{
            "meshes": [{"name": "Cube", "path": "builtin:cube"}],
            "textures": [{"name": "Gone", "path": "missing.png", "type": "diffuse"}],
            "entities": [
                {"name": "Textured", "mesh": {"name": "Cube", "textures": [{"name": "Gone"}]}},
                {"name": "Orphan", "mesh": {"name": "Teapot"}}
            ]
        }"#;
        let mut ctx = context();
        SceneFile::from_json(source).unwrap().apply(&mut ctx).unwrap();

        let world = ctx.world();
        let textured = world.find_by_name("Textured").unwrap();
        assert!(world.get::<MeshComponent>(textured).unwrap().textures().is_empty());
        let orphan = world.find_by_name("Orphan").unwrap();
        assert!(!world.has::<MeshComponent>(orphan));
    }

    #[test]
    fn test_inline_mesh_omitted() {
        let mut ctx = context();
        let e = ctx.world_mut().spawn("Inline");
        ctx.world_mut().insert(e, MeshComponent::default()).unwrap();

        let scene = SceneFile::capture(&ctx);
        assert_eq!(scene.entities.len(), 1);
        assert!(scene.entities[0].mesh.is_none());
    }

    #[test]
    fn test_field_names() {
        let mut ctx = context();
        factory::create_cube(&mut ctx).unwrap();
        let json = SceneFile::capture(&ctx).to_json().unwrap();
        assert!(json.contains("\"path\": \"builtin:cube\""));
        assert!(json.contains("\"scale\""));
        assert!(!json.contains("point_light"));
    }
}
