//! Entity-Component-System implementation
//!
//! Sparse-set component storage with per-entity presence masks. Entities carry a
//! display name; queries select entities by the components they have and lack.

pub mod world;
pub mod entity;
pub mod component;
pub mod sparse_set;
pub mod components;
pub mod systems;

pub use world::World;
pub use entity::Entity;
pub use component::{Component, ComponentMask};

use thiserror::Error;

/// ECS errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Handle refers to a destroyed entity
    #[error("Entity {0} is not alive")]
    DeadEntity(Entity),

    /// Rename to an empty string
    #[error("Entity names must not be empty")]
    EmptyName,
}
