//! ECS World implementation

use super::component::{Component, ComponentMask, ComponentStorages};
use super::{EcsError, Entity};
use crate::render::device::GpuMesh;

/// Display names longer than this are truncated
pub const MAX_NAME_LENGTH: usize = 256;

#[derive(Debug)]
struct EntityRecord {
    generation: u32,
    alive: bool,
    name: String,
    mask: ComponentMask,
}

/// ECS World containing all entities and components
#[derive(Debug, Default)]
pub struct World {
    records: Vec<EntityRecord>,
    free: Vec<u32>,
    storages: ComponentStorages,
    live: usize,
    orphaned: Vec<GpuMesh>,
}

fn clamp_name(name: &str) -> String {
    if name.chars().count() > MAX_NAME_LENGTH {
        log::warn!("Entity name truncated to {MAX_NAME_LENGTH} characters");
        name.chars().take(MAX_NAME_LENGTH).collect()
    } else {
        name.to_string()
    }
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, entity: Entity) -> Option<&EntityRecord> {
        self.records
            .get(entity.index() as usize)
            .filter(|r| r.alive && r.generation == entity.generation())
    }

    fn record_mut(&mut self, entity: Entity) -> Option<&mut EntityRecord> {
        self.records
            .get_mut(entity.index() as usize)
            .filter(|r| r.alive && r.generation == entity.generation())
    }

    /// Create a new entity with a display name
    pub fn spawn(&mut self, name: &str) -> Entity {
        let name = clamp_name(name);
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let record = &mut self.records[index as usize];
            record.alive = true;
            record.name = name;
            record.mask = ComponentMask::empty();
            return Entity::new(index, record.generation);
        }

        let index = self.records.len() as u32;
        self.records.push(EntityRecord {
            generation: 0,
            alive: true,
            name,
            mask: ComponentMask::empty(),
        });
        Entity::new(index, 0)
    }

    /// Destroy an entity and release its components. Returns false for stale handles.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let Some(record) = self.record_mut(entity) else {
            return false;
        };

        record.alive = false;
        record.generation = record.generation.wrapping_add(1);
        record.mask = ComponentMask::empty();
        record.name.clear();

        if let Some(gpu) = self.storages.remove_all(entity.index()) {
            self.orphaned.push(gpu);
        }
        self.free.push(entity.index());
        self.live -= 1;
        log::debug!("Despawned entity {entity}");
        true
    }

    /// Destroy every entity
    pub fn clear(&mut self) {
        for (index, record) in self.records.iter_mut().enumerate() {
            if record.alive {
                record.alive = false;
                record.generation = record.generation.wrapping_add(1);
                record.mask = ComponentMask::empty();
                record.name.clear();
                self.free.push(index as u32);
            }
        }
        self.orphaned.extend(self.storages.owned_gpu_meshes());
        self.storages.clear();
        self.live = 0;
    }

    /// Whether the handle refers to a live entity
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.record(entity).is_some()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the world has no live entities
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Display name of a live entity
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.record(entity).map(|r| r.name.as_str())
    }

    /// Rename an entity. Empty names are rejected.
    pub fn set_name(&mut self, entity: Entity, name: &str) -> Result<(), EcsError> {
        if name.is_empty() {
            return Err(EcsError::EmptyName);
        }
        let name = clamp_name(name);
        let record = self.record_mut(entity).ok_or(EcsError::DeadEntity(entity))?;
        record.name = name;
        Ok(())
    }

    /// First live entity with the given display name, in index order
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        let found = self.entities().find(|(_, n)| *n == name).map(|(e, _)| e);
        if found.is_none() {
            log::warn!("No entity named '{name}'");
        }
        found
    }

    /// Live entities and their names, in index order
    pub fn entities(&self) -> impl Iterator<Item = (Entity, &str)> {
        self.records.iter().enumerate().filter(|(_, r)| r.alive).map(|(index, r)| {
            (Entity::new(index as u32, r.generation), r.name.as_str())
        })
    }

    /// Component presence mask of a live entity
    pub fn mask(&self, entity: Entity) -> Option<ComponentMask> {
        self.record(entity).map(|r| r.mask)
    }

    /// Attach (or replace) a component
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Result<(), EcsError> {
        let record = self.record_mut(entity).ok_or(EcsError::DeadEntity(entity))?;
        record.mask.insert(T::MASK);
        let replaced = T::storage_mut(&mut self.storages).insert(entity.index(), component);
        if let Some(gpu) = replaced.as_ref().and_then(T::owned_gpu_mesh) {
            self.orphaned.push(gpu);
        }
        Ok(())
    }

    /// Device buffers left behind by despawned or replaced inline meshes.
    ///
    /// The world has no device; its owner deletes these.
    pub fn take_orphaned_meshes(&mut self) -> Vec<GpuMesh> {
        std::mem::take(&mut self.orphaned)
    }

    /// Component of a live entity
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.record(entity)?;
        T::storage(&self.storages).get(entity.index())
    }

    /// Mutable component of a live entity
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.record(entity)?;
        T::storage_mut(&mut self.storages).get_mut(entity.index())
    }

    /// Detach a component
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let record = self.record_mut(entity)?;
        record.mask.remove(T::MASK);
        T::storage_mut(&mut self.storages).remove(entity.index())
    }

    /// Whether a live entity carries `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.mask(entity).is_some_and(|m| m.contains(T::MASK))
    }

    /// Live entities whose mask contains all of `with` and none of `without`, in index order
    pub fn query(&self, with: ComponentMask, without: ComponentMask) -> Vec<Entity> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.alive && r.mask.contains(with) && !r.mask.intersects(without))
            .map(|(index, r)| Entity::new(index as u32, r.generation))
            .collect()
    }
}
