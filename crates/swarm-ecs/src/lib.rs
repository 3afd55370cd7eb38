//! Swarm ECS - Entity store with stable IDs
//!
//! This crate wraps hecs with stable identifiers for named entities,
//! world-global singletons, and a `ChildOf` grouping relation whose children
//! can be read back as one contiguous column.

mod entity;
mod singleton;
mod world;

pub use entity::{ChildOf, EntityInfo};
pub use hecs::{Archetype, Component};
pub use singleton::Singletons;
pub use world::SwarmWorld;
