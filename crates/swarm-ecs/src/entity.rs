//! Entity information and the grouping relation

use swarm_core::EntityId;
use serde::{Deserialize, Serialize};

/// Marks an entity as a member of `parent`'s group.
///
/// Grouping only: a child's transform is never composed with its parent's.
/// `order` is the world-wide sequence number of the link, so members can be
/// listed in creation order however storage has shuffled them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildOf {
    pub parent: EntityId,
    pub order: u64,
}

impl ChildOf {
    pub fn new(parent: EntityId, order: u64) -> Self {
        Self { parent, order }
    }
}

/// Information about a named entity for logging and summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityInfo {
    /// The stable entity ID
    pub id: EntityId,
    /// Human-readable name
    pub name: String,
    /// Parent entity name (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Number of entities grouped under this one
    pub children: usize,
}

impl EntityInfo {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: 0,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_children(mut self, children: usize) -> Self {
        self.children = children;
        self
    }
}
