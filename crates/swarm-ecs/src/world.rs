//! SwarmWorld - ECS world with stable IDs, singletons and grouping

use crate::entity::{ChildOf, EntityInfo};
use crate::singleton::Singletons;
use bimap::BiMap;
use hecs::{Archetype, Component, DynamicBundle};
use std::collections::HashMap;
use swarm_core::{EntityId, IdAllocator, Result, SwarmError};

/// The entity store for Swarm
///
/// Wraps hecs::World with:
/// - Stable EntityId mapping for named entities
/// - Named entity lookup
/// - Type-keyed singletons
/// - Bulk spawning of anonymous children under a named parent
pub struct SwarmWorld {
    /// The underlying hecs world
    world: hecs::World,
    /// Source of ids for named entities
    ids: IdAllocator,
    /// Bidirectional mapping: EntityId <-> hecs::Entity
    id_map: BiMap<EntityId, hecs::Entity>,
    /// Entity name -> EntityId mapping
    name_map: HashMap<String, EntityId>,
    /// World-global values
    singletons: Singletons,
    /// Sequence number for the next `ChildOf` link
    next_link: u64,
}

impl Default for SwarmWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SwarmWorld {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            ids: IdAllocator::new(),
            id_map: BiMap::new(),
            name_map: HashMap::new(),
            singletons: Singletons::new(),
            next_link: 0,
        }
    }

    /// Spawn a new named entity with no components
    pub fn spawn(&mut self, name: impl Into<String>) -> Result<EntityId> {
        self.spawn_with(name, ())
    }

    /// Spawn a new named entity with an initial set of components
    pub fn spawn_with(
        &mut self,
        name: impl Into<String>,
        components: impl DynamicBundle,
    ) -> Result<EntityId> {
        let name = name.into();

        if self.name_map.contains_key(&name) {
            return Err(SwarmError::DuplicateEntityName(name));
        }

        let entity_id = self.ids.allocate();
        let hecs_entity = self.world.spawn(components);

        self.id_map.insert(entity_id, hecs_entity);
        self.name_map.insert(name, entity_id);

        Ok(entity_id)
    }

    /// Spawn `count` anonymous children of `parent` in one batch.
    ///
    /// `make` receives the child's index and its `ChildOf` link, which must be
    /// part of the returned bundle. Links are numbered in index order, so
    /// column reads preserve creation order.
    pub fn spawn_children<B, F>(&mut self, parent: EntityId, count: usize, mut make: F) -> Result<usize>
    where
        B: hecs::Bundle + 'static,
        F: FnMut(usize, ChildOf) -> B,
    {
        self.entity(parent)?;
        let first = self.next_link;
        self.next_link += count as u64;
        let spawned = self
            .world
            .spawn_batch((0..count).map(|i| make(i, ChildOf::new(parent, first + i as u64))))
            .count();

        log::debug!("spawned {spawned} children under entity {parent}");
        Ok(spawned)
    }

    /// Despawn a named entity. Its children keep their (now dangling) link.
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let hecs_entity = self.entity(id)?;

        self.world
            .despawn(hecs_entity)
            .map_err(|_| SwarmError::EntityNotFound(id.to_string()))?;

        self.name_map.retain(|_, v| *v != id);
        self.id_map.remove_by_left(&id);

        Ok(())
    }

    /// Get entity ID by name
    pub fn get_id(&self, name: &str) -> Option<EntityId> {
        self.name_map.get(name).copied()
    }

    /// Get entity name by ID
    pub fn get_name(&self, id: EntityId) -> Option<&str> {
        self.name_map
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.as_str())
    }

    /// Insert or replace a component on a named entity
    pub fn insert<T: Component>(&mut self, id: EntityId, component: T) -> Result<()> {
        let entity = self.entity(id)?;
        self.world
            .insert_one(entity, component)
            .map_err(|_| SwarmError::EntityNotFound(id.to_string()))
    }

    /// Borrow a component of a named entity
    pub fn get<T: Component>(&self, id: EntityId) -> Result<hecs::Ref<'_, T>> {
        let entity = self.entity(id)?;
        self.world
            .get::<&T>(entity)
            .map_err(|_| SwarmError::ComponentNotFound {
                entity: id.to_string(),
                component: std::any::type_name::<T>().to_string(),
            })
    }

    /// Check whether a named entity carries component `T`
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.id_map
            .get_by_left(&id)
            .is_some_and(|e| self.world.satisfies::<&T>(*e).unwrap_or(false))
    }

    /// Group a named entity under another one
    pub fn set_parent(&mut self, child: EntityId, parent: EntityId) -> Result<()> {
        self.entity(parent)?;
        let link = ChildOf::new(parent, self.next_link);
        self.insert(child, link)?;
        self.next_link += 1;
        Ok(())
    }

    /// Get the group parent of a named entity
    pub fn get_parent(&self, child: EntityId) -> Option<EntityId> {
        self.get::<ChildOf>(child).ok().map(|link| link.parent)
    }

    /// Number of entities (named or not) grouped under `parent`
    pub fn child_count(&self, parent: EntityId) -> usize {
        self.world
            .archetypes()
            .filter_map(|a| a.get::<&ChildOf>())
            .map(|links| links.iter().filter(|l| l.parent == parent).count())
            .sum()
    }

    /// Read component `T` of every child of `parent` as one contiguous slice,
    /// ordered by creation.
    ///
    /// When all children share one archetype, nothing else lives in it and
    /// its rows are still in link order, `f` sees the storage column directly.
    /// Otherwise the values are gathered into a temporary buffer and sorted by
    /// `ChildOf::order`.
    pub fn with_child_column<T, R>(&self, parent: EntityId, f: impl FnOnce(&[T]) -> R) -> Result<R>
    where
        T: Component + Copy,
    {
        self.entity(parent)?;

        let candidates: Vec<&Archetype> = self
            .world
            .archetypes()
            .filter(|a| a.len() > 0 && a.has::<ChildOf>() && a.has::<T>())
            .collect();

        if let [single] = candidates.as_slice() {
            if let (Some(links), Some(column)) = (single.get::<&ChildOf>(), single.get::<&T>()) {
                let ours = links.iter().all(|l| l.parent == parent);
                if ours && links.windows(2).all(|w| w[0].order < w[1].order) {
                    return Ok(f(&column));
                }
            }
        }

        let mut rows: Vec<(u64, T)> = Vec::new();
        for archetype in candidates {
            let (Some(links), Some(column)) = (archetype.get::<&ChildOf>(), archetype.get::<&T>())
            else {
                continue;
            };
            for (l, value) in links.iter().zip(column.iter()) {
                if l.parent == parent {
                    rows.push((l.order, *value));
                }
            }
        }
        rows.sort_unstable_by_key(|(order, _)| *order);
        let values: Vec<T> = rows.into_iter().map(|(_, v)| v).collect();

        log::trace!("gathered {} scattered child rows", values.len());
        Ok(f(&values))
    }

    /// Archetypes that currently hold entities, for column-wise passes.
    ///
    /// Takes `&mut self` so a pass holding these columns has exclusive access
    /// to the world for its whole duration.
    pub fn archetypes_mut(&mut self) -> impl Iterator<Item = &Archetype> + '_ {
        self.world.archetypes().filter(|a| a.len() > 0)
    }

    /// Insert or replace a world-global value
    pub fn set_singleton<T: Component>(&mut self, value: T) {
        self.singletons.set(value);
    }

    /// Read a world-global value
    pub fn singleton<T: Component>(&self) -> Result<&T> {
        self.singletons.get::<T>()
    }

    pub fn has_singleton<T: Component>(&self) -> bool {
        self.singletons.contains::<T>()
    }

    /// Get info about all named entities
    pub fn all_entities(&self) -> Vec<EntityInfo> {
        let mut infos: Vec<EntityInfo> = self
            .name_map
            .iter()
            .map(|(name, id)| {
                let mut info =
                    EntityInfo::new(*id, name.clone()).with_children(self.child_count(*id));
                if let Some(parent) = self.get_parent(*id).and_then(|p| self.get_name(p)) {
                    info = info.with_parent(parent);
                }
                info
            })
            .collect();
        infos.sort_by_key(|info| info.id);
        infos
    }

    /// Number of named entities
    pub fn entity_count(&self) -> usize {
        self.name_map.len()
    }

    /// Number of entities of any kind
    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    /// Check if a named entity exists
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_map.contains_left(&id)
    }

    /// Check if an entity with name exists
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_map.contains_key(name)
    }

    fn entity(&self, id: EntityId) -> Result<hecs::Entity> {
        self.id_map
            .get_by_left(&id)
            .copied()
            .ok_or_else(|| SwarmError::EntityNotFound(id.to_string()))
    }
}
