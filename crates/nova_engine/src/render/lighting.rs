//! Point-light registry
//!
//! Tracks which entities act as point lights and which programs consume lighting
//! uniforms. After every change the whole `pointLights[]` array is rewritten into
//! every registered program, so the tracked list, the uniform array and
//! `nPointLights` always agree. Slots vacated by a removal are zeroed.

use thiserror::Error;

use super::device::{GraphicsDevice, ProgramHandle, UniformValue};
use crate::ecs::components::{LightBase, PointLight, Transform};
use crate::ecs::{Entity, World};
use crate::foundation::math::Vec3;

/// Size of the `pointLights` uniform array
pub const MAX_POINT_LIGHTS: usize = 10;

/// Uniform holding the number of active point lights
pub const POINT_LIGHT_COUNT_UNIFORM: &str = "nPointLights";

/// Light registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LightError {
    /// Entity lacks a PointLight or Transform
    #[error("Entity {0} has no point light and transform")]
    MissingPointLight(Entity),

    /// Already tracking the maximum number of lights
    #[error("Point light capacity of {0} reached")]
    CapacityExceeded(usize),

    /// Entity is already tracked
    #[error("Entity {0} is already a registered point light")]
    AlreadyTracked(Entity),

    /// Entity is not tracked
    #[error("Entity {0} is not a registered point light")]
    NotTracked(Entity),

    /// No entity with that name is tracked
    #[error("No registered point light named '{0}'")]
    NameNotFound(String),

    /// Program handle does not name a linked program
    #[error("Cannot register an invalid program")]
    InvalidProgram,
}

/// Active point lights and the programs receiving them
#[derive(Debug, Default)]
pub struct LightRegistry {
    programs: Vec<ProgramHandle>,
    lights: Vec<Entity>,
}

fn slot_name(index: usize, field: &str) -> String {
    format!("pointLights[{index}].{field}")
}

fn write_slot(
    device: &mut dyn GraphicsDevice,
    program: ProgramHandle,
    index: usize,
    position: Vec3,
    light: &PointLight,
) {
    device.set_uniform(program, &slot_name(index, "position"), UniformValue::Vec3(position));
    device.set_uniform(program, &slot_name(index, "ambient"), UniformValue::Vec3(light.base.ambient));
    device.set_uniform(program, &slot_name(index, "diffuse"), UniformValue::Vec3(light.base.diffuse));
    device.set_uniform(program, &slot_name(index, "specular"), UniformValue::Vec3(light.base.specular));
    device.set_uniform(program, &slot_name(index, "constant"), UniformValue::Float(light.constant));
    device.set_uniform(program, &slot_name(index, "linear"), UniformValue::Float(light.linear));
    device.set_uniform(program, &slot_name(index, "quadratic"), UniformValue::Float(light.quadratic));
}

fn zero_slot(device: &mut dyn GraphicsDevice, program: ProgramHandle, index: usize) {
    let off = PointLight {
        base: LightBase {
            ambient: Vec3::zeros(),
            diffuse: Vec3::zeros(),
            specular: Vec3::zeros(),
        },
        constant: 0.0,
        linear: 0.0,
        quadratic: 0.0,
    };
    write_slot(device, program, index, Vec3::zeros(), &off);
}

fn is_point_light(world: &World, entity: Entity) -> bool {
    world.has::<PointLight>(entity) && world.has::<Transform>(entity)
}

impl LightRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracked lights in uniform-array order
    pub fn lights(&self) -> &[Entity] {
        &self.lights
    }

    /// Programs receiving light uniforms
    pub fn programs(&self) -> &[ProgramHandle] {
        &self.programs
    }

    /// Number of tracked lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no lights are tracked
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Whether `entity` is tracked
    pub fn contains(&self, entity: Entity) -> bool {
        self.lights.contains(&entity)
    }

    /// Start pushing lights into `program`, writing the current lights immediately
    pub fn register_program(
        &mut self,
        program: ProgramHandle,
        world: &World,
        device: &mut dyn GraphicsDevice,
    ) -> Result<(), LightError> {
        if !program.is_valid() {
            log::warn!("Refusing to register an invalid program for lighting");
            return Err(LightError::InvalidProgram);
        }

        if !self.programs.contains(&program) {
            self.programs.push(program);
        }

        let previous = self.prune(world);
        if previous == self.lights.len() {
            self.write_into(program, world, device, previous);
        } else {
            self.write_all(world, device, previous);
        }
        Ok(())
    }

    /// Stop pushing into `program`
    pub fn unregister_program(&mut self, program: ProgramHandle) -> bool {
        let before = self.programs.len();
        self.programs.retain(|p| *p != program);
        before != self.programs.len()
    }

    /// Stop pushing into every program
    pub fn clear_programs(&mut self) {
        self.programs.clear();
    }

    /// Track a point light and rewrite every program
    pub fn add_point_light(
        &mut self,
        entity: Entity,
        world: &World,
        device: &mut dyn GraphicsDevice,
    ) -> Result<(), LightError> {
        if !is_point_light(world, entity) {
            log::warn!("Entity {entity} added as a point light without PointLight and Transform");
            return Err(LightError::MissingPointLight(entity));
        }

        let previous = self.prune(world);

        if self.lights.contains(&entity) {
            log::warn!("Entity {entity} is already a registered point light");
            self.write_all(world, device, previous);
            return Err(LightError::AlreadyTracked(entity));
        }

        if self.lights.len() >= MAX_POINT_LIGHTS {
            log::warn!("Point light limit of {MAX_POINT_LIGHTS} reached, {entity} not added");
            self.write_all(world, device, previous);
            return Err(LightError::CapacityExceeded(MAX_POINT_LIGHTS));
        }

        self.lights.push(entity);
        log::debug!("Registered point light {entity} in slot {}", self.lights.len() - 1);
        self.write_all(world, device, previous);
        Ok(())
    }

    /// Stop tracking a light; later lights move down one slot
    pub fn remove_point_light(
        &mut self,
        entity: Entity,
        world: &World,
        device: &mut dyn GraphicsDevice,
    ) -> Result<(), LightError> {
        let previous = self.lights.len();
        let Some(index) = self.lights.iter().position(|e| *e == entity) else {
            return Err(LightError::NotTracked(entity));
        };

        self.lights.remove(index);
        self.prune(world);
        log::debug!("Removed point light {entity} from slot {index}");
        self.write_all(world, device, previous);
        Ok(())
    }

    /// Remove the tracked light whose entity has display name `name`
    pub fn remove_point_light_by_name(
        &mut self,
        name: &str,
        world: &World,
        device: &mut dyn GraphicsDevice,
    ) -> Result<(), LightError> {
        let found = self
            .lights
            .iter()
            .copied()
            .find(|e| world.name(*e) == Some(name));

        match found {
            Some(entity) => self.remove_point_light(entity, world, device),
            None => {
                log::warn!("No registered point light named '{name}'");
                Err(LightError::NameNotFound(name.to_string()))
            }
        }
    }

    /// Stop tracking every light, zeroing their slots
    pub fn clear_lights(&mut self, world: &World, device: &mut dyn GraphicsDevice) {
        let previous = self.lights.len();
        self.lights.clear();
        self.write_all(world, device, previous);
    }

    /// Rewrite one light's slot in every program
    pub fn push_light(&mut self, entity: Entity, world: &World, device: &mut dyn GraphicsDevice) {
        let previous = self.prune(world);
        if previous != self.lights.len() {
            self.write_all(world, device, previous);
            return;
        }

        let Some(index) = self.lights.iter().position(|e| *e == entity) else {
            log::warn!("Entity {entity} is not a registered point light");
            return;
        };

        let (Some(transform), Some(light)) = (world.get::<Transform>(entity), world.get::<PointLight>(entity)) else {
            return;
        };

        for &program in &self.programs {
            write_slot(device, program, index, transform.position, light);
            device.set_uniform(program, POINT_LIGHT_COUNT_UNIFORM, UniformValue::Int(self.lights.len() as i32));
        }
    }

    /// Rewrite every slot in every program
    pub fn push_all(&mut self, world: &World, device: &mut dyn GraphicsDevice) {
        let previous = self.prune(world);
        self.write_all(world, device, previous);
    }

    /// Drop tracked entities that died or lost their light. Returns the length before pruning.
    fn prune(&mut self, world: &World) -> usize {
        let previous = self.lights.len();
        self.lights.retain(|&entity| {
            let keep = world.is_alive(entity) && is_point_light(world, entity);
            if !keep {
                log::warn!("Dropping stale point light {entity}");
            }
            keep
        });
        previous
    }

    fn write_all(&self, world: &World, device: &mut dyn GraphicsDevice, previous_len: usize) {
        for &program in &self.programs {
            self.write_into(program, world, device, previous_len);
        }
    }

    fn write_into(&self, program: ProgramHandle, world: &World, device: &mut dyn GraphicsDevice, previous_len: usize) {
        for (index, &entity) in self.lights.iter().enumerate() {
            if let (Some(transform), Some(light)) = (world.get::<Transform>(entity), world.get::<PointLight>(entity)) {
                write_slot(device, program, index, transform.position, light);
            }
        }

        for index in self.lights.len()..previous_len {
            zero_slot(device, program, index);
        }

        device.set_uniform(program, POINT_LIGHT_COUNT_UNIFORM, UniformValue::Int(self.lights.len() as i32));
    }
}
