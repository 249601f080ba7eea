//! Arena module for the shooter simulation.
//!
//! The Arena is the container for all entities in a session. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Entity lifecycle management (spawn, sweep, despawn)
//! - The per-tick live-target snapshot weapons aim with
//!
//! # Determinism
//!
//! Entity IDs are monotonically increasing and never reused, so iterating the
//! `BTreeMap` visits entities in spawn order on every platform.
//!
//! # Example
//!
//! ```
//! use skystrike_core::arena::Arena;
//! use skystrike_core::entity::{EnemyComponents, EntityInner, EntityTag, Pose};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let a = arena.spawn(
//!     EntityTag::Enemy,
//!     EntityInner::Enemy(EnemyComponents::with_health(10.0)),
//!     Pose::at(Vec2::new(0.0, 20.0)),
//! );
//! let b = arena.spawn(
//!     EntityTag::Enemy,
//!     EntityInner::Enemy(EnemyComponents::with_health(10.0)),
//!     Pose::at(Vec2::new(5.0, 20.0)),
//! );
//!
//! let ids: Vec<_> = arena.entity_ids_sorted().collect();
//! assert_eq!(ids, vec![a, b]);
//! assert_eq!(arena.live_targets().len(), 2);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityInner, EntityTag, Pose};
use crate::weapon::{LiveTarget, LiveTargets};

/// Session arena containing all simulation entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Current simulation tick.
    tick: u64,
}

impl Arena {
    /// Creates a new empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity and returns its ID.
    ///
    /// `tag` must match the `inner` variant; the stored tag is always derived
    /// from `inner`.
    pub fn spawn(&mut self, tag: EntityTag, inner: EntityInner, pose: Pose) -> EntityId {
        debug_assert_eq!(tag, inner.tag(), "spawn tag does not match components");
        self.spawn_with(|id| Entity::new(id, inner, pose))
    }

    /// Spawns an entity built by `build` from the freshly assigned ID.
    ///
    /// Use this to attach bounds or motion before the entity is stored.
    pub fn spawn_with(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = build(id);
        debug_assert_eq!(entity.id(), id, "builder must keep the assigned ID");
        self.entities.insert(id, entity);
        id
    }

    /// Removes an entity immediately, returning it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Removes every entity that is no longer alive and returns their IDs in
    /// sorted order.
    pub fn sweep(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| !e.is_alive())
            .map(Entity::id)
            .collect();
        for id in &dead {
            self.entities.remove(id);
        }
        dead
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns the entity only while it is alive.
    #[must_use]
    pub fn get_alive(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id).filter(|e| e.is_alive())
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in deterministic (sorted by ID) order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over mutable entities in deterministic order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Snapshot of every alive enemy, in ID order.
    #[must_use]
    pub fn live_targets(&self) -> LiveTargets {
        self.entities
            .values()
            .filter(|e| e.is_alive() && e.is_enemy())
            .map(|e| LiveTarget {
                id: e.id(),
                position: e.pose.position,
            })
            .collect()
    }

    /// Number of alive entities with the given tag.
    #[must_use]
    pub fn count_alive(&self, tag: EntityTag) -> usize {
        self.entities
            .values()
            .filter(|e| e.is_alive() && e.tag() == tag)
            .count()
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================
