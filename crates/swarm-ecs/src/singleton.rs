//! World-global values keyed by type

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use swarm_core::{Result, SwarmError};

/// Type-keyed storage for values that exist once per world.
///
/// Values must be `Send + Sync` so parallel passes can read them without
/// locking.
#[derive(Default)]
pub struct Singletons {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Singletons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value of type `T`
    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Result<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .ok_or(SwarmError::SingletonNotFound(type_name::<T>()))
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
