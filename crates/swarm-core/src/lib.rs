//! Swarm Core - Foundational types for the Swarm simulator
//!
//! This crate provides the types that every other Swarm crate depends on:
//! - `EntityId` - Stable identifiers for named entities
//! - Error types and Result alias

mod error;
mod id;

pub use error::{Result, SwarmError};
pub use id::{EntityId, IdAllocator};
