//! Stable entity identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a named entity, stable for the lifetime of its world.
///
/// The underlying ECS handle may be recycled; `EntityId` is what callers keep
/// hold of (for example the particle system anchor).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Create an EntityId from a raw value (for deserialization/testing)
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-world id source. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u64 {
        self.next - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_per_allocator() {
        let mut a = IdAllocator::new();
        let first = a.allocate();
        let second = a.allocate();
        assert_eq!(first.raw(), 1);
        assert!(second > first);
        assert_eq!(a.allocated(), 2);

        // A fresh allocator starts over, so two worlds never depend on each other
        let mut b = IdAllocator::new();
        assert_eq!(b.allocate(), first);
    }

    #[test]
    fn test_from_raw() {
        let id = EntityId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "EntityId(42)");
    }
}
