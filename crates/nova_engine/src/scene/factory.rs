//! Preset entities offered by the editor's "New Object" menu

use super::SceneError;
use crate::ecs::components::{CameraComponent, MeshComponent, PointLight, Transform};
use crate::ecs::Entity;
use crate::engine::EngineContext;
use crate::foundation::math::Vec3;

/// Texture attached to new cubes when it has been imported
pub const DEFAULT_CUBE_TEXTURE: &str = "Container";

fn cube_mesh(ctx: &mut EngineContext, textured: bool) -> Option<MeshComponent> {
    let key = ctx.meshes.cube(ctx.device.as_mut())?;
    let mut mesh = MeshComponent::shared(key);

    if textured && ctx.textures.contains_name(DEFAULT_CUBE_TEXTURE) {
        if let Some(texture) = ctx.textures.find(DEFAULT_CUBE_TEXTURE) {
            mesh = mesh.with_textures(vec![texture]);
        }
    }
    Some(mesh)
}

/// Unit cube at the origin sharing the built-in cube mesh
pub fn create_cube(ctx: &mut EngineContext) -> Result<Entity, SceneError> {
    let entity = ctx.world.spawn("Cube");
    ctx.world.insert(entity, Transform::default())?;

    match cube_mesh(ctx, true) {
        Some(mesh) => ctx.world.insert(entity, mesh)?,
        None => log::warn!("Cube {entity} created without a mesh"),
    }

    log::debug!("Created cube {entity}");
    Ok(entity)
}

/// Data-only scene camera
pub fn create_camera(ctx: &mut EngineContext) -> Result<Entity, SceneError> {
    let entity = ctx.world.spawn("Camera");
    ctx.world.insert(entity, Transform::default())?;
    ctx.world.insert(entity, CameraComponent::default())?;
    log::debug!("Created camera {entity}");
    Ok(entity)
}

/// Visible point light: a small cube drawn by the light pass
pub fn create_light_cube(ctx: &mut EngineContext) -> Result<Entity, SceneError> {
    let entity = ctx.world.spawn("Point Light");
    let transform = Transform::from_position(Vec3::new(1.2, 1.0, 2.0)).with_scale(Vec3::repeat(0.2));
    ctx.world.insert(entity, transform)?;
    ctx.world.insert(entity, PointLight::default())?;

    if let Some(mesh) = cube_mesh(ctx, false) {
        ctx.world.insert(entity, mesh)?;
    }

    track(ctx, entity)
}

/// Point light without geometry
pub fn create_default_point_light(ctx: &mut EngineContext) -> Result<Entity, SceneError> {
    let entity = ctx.world.spawn("Point Light");
    ctx.world.insert(entity, Transform::default())?;
    ctx.world.insert(entity, PointLight::default())?;
    track(ctx, entity)
}

fn track(ctx: &mut EngineContext, entity: Entity) -> Result<Entity, SceneError> {
    match ctx.lights.add_point_light(entity, &ctx.world, ctx.device.as_mut()) {
        Ok(()) => {
            log::debug!("Created point light {entity}");
            Ok(entity)
        }
        Err(e) => {
            ctx.world.despawn(entity);
            ctx.release_orphaned_meshes();
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::ComponentMask;
    use crate::engine::test_support::context;
    use crate::render::{LightError, TextureType, MAX_POINT_LIGHTS};
    use approx::assert_relative_eq;

    #[test]
    fn test_cubes_share_one_mesh() {
        let mut ctx = context();
        let a = create_cube(&mut ctx).unwrap();
        let b = create_cube(&mut ctx).unwrap();

        let key_a = ctx.world().get::<MeshComponent>(a).unwrap().mesh_key();
        let key_b = ctx.world().get::<MeshComponent>(b).unwrap().mesh_key();
        assert!(key_a.is_some());
        assert_eq!(key_a, key_b);
        assert_eq!(ctx.meshes().len(), 1);
        assert!(ctx.world().get::<MeshComponent>(a).unwrap().textures().is_empty());
    }

    #[test]
    fn test_cube_picks_up_container_texture() {
        let mut ctx = context();
        let container = ctx
            .import_texture(DEFAULT_CUBE_TEXTURE, Some("container.jpg".into()), TextureType::Diffuse)
            .unwrap();
        let cube = create_cube(&mut ctx).unwrap();
        assert_eq!(ctx.world().get::<MeshComponent>(cube).unwrap().textures(), &[container]);
    }

    #[test]
    fn test_camera_is_data_only() {
        let mut ctx = context();
        let cam = create_camera(&mut ctx).unwrap();
        assert_eq!(
            ctx.world().mask(cam),
            Some(ComponentMask::TRANSFORM | ComponentMask::CAMERA)
        );
        assert_relative_eq!(ctx.world().get::<CameraComponent>(cam).unwrap().fov, 45.0);
    }

    #[test]
    fn test_light_cube_is_tracked() {
        let mut ctx = context();
        let lamp = create_light_cube(&mut ctx).unwrap();
        assert!(ctx.world().has::<MeshComponent>(lamp));
        assert_eq!(ctx.lights().lights(), &[lamp]);
        assert_relative_eq!(ctx.world().get::<Transform>(lamp).unwrap().scale, Vec3::repeat(0.2));
    }

    #[test]
    fn test_light_over_capacity_is_not_spawned() {
        let mut ctx = context();
        for _ in 0..MAX_POINT_LIGHTS {
            create_default_point_light(&mut ctx).unwrap();
        }
        let before = ctx.world().len();
        assert!(matches!(
            create_default_point_light(&mut ctx),
            Err(SceneError::Light(LightError::CapacityExceeded(MAX_POINT_LIGHTS)))
        ));
        assert_eq!(ctx.world().len(), before);
    }
}
