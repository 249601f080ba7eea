//! Entity types for the shooter simulation.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Type classification (hero, enemy, projectile, power-up)
//! - [`EntityInner`]: Type-safe storage for kind-specific components
//! - [`DestructionState`]: The single exactly-once guard for removal side effects
//! - [`Entity`]: The complete entity container
//!
//! # Example
//!
//! ```
//! use skystrike_core::entity::{Entity, EntityId, EntityTag};
//! use glam::Vec2;
//!
//! let enemy = Entity::new_enemy(EntityId::new(42), Vec2::new(0.0, 10.0), 5.0);
//!
//! assert_eq!(enemy.id().as_u64(), 42);
//! assert_eq!(enemy.tag(), EntityTag::Enemy);
//! assert!(enemy.is_alive());
//! ```

pub mod components;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bounds::{BoundsBinding, BoundsFlags};
use crate::motion::MotionProfile;

pub use components::{
    ColliderId, CompositeShields, EnemyComponents, HeroComponents, Pose, PowerUpComponents,
    ProjectileComponents, ShieldHit, ShieldId, ShieldLevel, ShieldPool, SubShield,
};

/// Unique identifier for an entity.
///
/// Entity IDs are assigned monotonically by the [`Arena`](crate::arena::Arena)
/// and are never reused within a session, so ordering by ID is spawn order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
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

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity type tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The player-controlled ship
    Hero,
    /// A hostile ship
    Enemy,
    /// A shot fired by a weapon
    Projectile,
    /// A reward pickup dropped by a destroyed enemy
    PowerUp,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hero => write!(f, "Hero"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
            Self::PowerUp => write!(f, "PowerUp"),
        }
    }
}

/// Type-safe storage for kind-specific components.
///
/// The variant always matches the entity's [`EntityTag`]; [`Entity::new`]
/// derives the tag from the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Hero components (shield level, contact de-duplication)
    Hero(HeroComponents),
    /// Enemy components (health, shields, reward odds)
    Enemy(EnemyComponents),
    /// Projectile components (weapon type, velocity, homing target)
    Projectile(ProjectileComponents),
    /// Power-up components (reward type)
    PowerUp(PowerUpComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Hero(_) => EntityTag::Hero,
            Self::Enemy(_) => EntityTag::Enemy,
            Self::Projectile(_) => EntityTag::Projectile,
            Self::PowerUp(_) => EntityTag::PowerUp,
        }
    }
}

/// Lifecycle state of an entity within a session.
///
/// Every removal path moves an entity out of `Alive` exactly once through
/// [`Entity::begin_destruction`] (or its siblings). Phases later in the same
/// tick skip entities that are no longer alive, and the arena sweeps them at
/// tick end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DestructionState {
    /// Participating in the simulation.
    #[default]
    Alive,
    /// Destroyed by damage or contact; notification already issued.
    Destroyed,
    /// A projectile or pickup used up on contact.
    Consumed,
    /// Removed by its own motion (lifetime over, left the screen, lost target).
    Expired,
}

/// A complete entity in the shooter simulation.
///
/// # Invariants
///
/// - The `EntityId` is unique within an arena
/// - The `EntityTag` matches the `EntityInner` variant
/// - `destruction` leaves `Alive` at most once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    tag: EntityTag,
    inner: EntityInner,
    /// Position and orientation.
    pub pose: Pose,
    /// Screen-bounds configuration, if the entity is bounded.
    pub bounds: Option<BoundsBinding>,
    /// Flags from the most recent bounds evaluation.
    pub bounds_flags: BoundsFlags,
    /// Motion profile driving the entity, if any.
    pub motion: Option<MotionProfile>,
    destruction: DestructionState,
}

impl Entity {
    /// Creates a new entity; the tag is derived from `inner`.
    #[must_use]
    pub fn new(id: EntityId, inner: EntityInner, pose: Pose) -> Self {
        Self {
            id,
            tag: inner.tag(),
            inner,
            pose,
            bounds: None,
            bounds_flags: BoundsFlags::ON_SCREEN,
            motion: None,
            destruction: DestructionState::Alive,
        }
    }

    /// Creates a plain enemy at `position` with `health` hit points.
    #[must_use]
    pub fn new_enemy(id: EntityId, position: Vec2, health: f32) -> Self {
        Self::new(
            id,
            EntityInner::Enemy(EnemyComponents::with_health(health)),
            Pose::at(position),
        )
    }

    /// Attaches a bounds binding.
    #[must_use]
    pub fn with_bounds(mut self, binding: BoundsBinding) -> Self {
        self.bounds = Some(binding);
        self
    }

    /// Attaches a motion profile.
    #[must_use]
    pub fn with_motion(mut self, motion: MotionProfile) -> Self {
        self.motion = Some(motion);
        self
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.tag
    }

    /// Returns a reference to the kind-specific components.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the kind-specific components.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn destruction(&self) -> DestructionState {
        self.destruction
    }

    /// Returns `true` while the entity takes part in the simulation.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self.destruction, DestructionState::Alive)
    }

    /// Marks the entity destroyed.
    ///
    /// Returns `true` only for the call that performed the transition; every
    /// destroy side effect must be gated on that result.
    pub fn begin_destruction(&mut self) -> bool {
        self.transition(DestructionState::Destroyed)
    }

    /// Marks the entity consumed. Same exactly-once contract as
    /// [`begin_destruction`](Self::begin_destruction).
    pub fn consume(&mut self) -> bool {
        self.transition(DestructionState::Consumed)
    }

    /// Marks the entity expired. Same exactly-once contract as
    /// [`begin_destruction`](Self::begin_destruction).
    pub fn expire(&mut self) -> bool {
        self.transition(DestructionState::Expired)
    }

    fn transition(&mut self, to: DestructionState) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.destruction = to;
        true
    }

    /// Returns `true` if this entity is the hero.
    #[must_use]
    pub const fn is_hero(&self) -> bool {
        matches!(self.tag, EntityTag::Hero)
    }

    /// Returns `true` if this entity is an enemy.
    #[must_use]
    pub const fn is_enemy(&self) -> bool {
        matches!(self.tag, EntityTag::Enemy)
    }

    /// Returns `true` if this entity is a projectile.
    #[must_use]
    pub const fn is_projectile(&self) -> bool {
        matches!(self.tag, EntityTag::Projectile)
    }

    /// Returns `true` if this entity is a power-up.
    #[must_use]
    pub const fn is_power_up(&self) -> bool {
        matches!(self.tag, EntityTag::PowerUp)
    }

    /// Returns the hero components if this is the hero.
    #[must_use]
    pub const fn as_hero(&self) -> Option<&HeroComponents> {
        match &self.inner {
            EntityInner::Hero(c) => Some(c),
            _ => None,
        }
    }

    /// Returns mutable hero components if this is the hero.
    #[must_use]
    pub fn as_hero_mut(&mut self) -> Option<&mut HeroComponents> {
        match &mut self.inner {
            EntityInner::Hero(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the enemy components if this is an enemy.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyComponents> {
        match &self.inner {
            EntityInner::Enemy(c) => Some(c),
            _ => None,
        }
    }

    /// Returns mutable enemy components if this is an enemy.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyComponents> {
        match &mut self.inner {
            EntityInner::Enemy(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the projectile components if this is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileComponents> {
        match &self.inner {
            EntityInner::Projectile(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the power-up components if this is a power-up.
    #[must_use]
    pub const fn as_power_up(&self) -> Option<&PowerUpComponents> {
        match &self.inner {
            EntityInner::PowerUp(c) => Some(c),
            _ => None,
        }
    }
}
