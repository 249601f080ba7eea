//! Component structs held by each entity type.
//!
//! Each [`EntityInner`](super::EntityInner) variant owns one of these structs.
//! Shared state (pose, bounds, motion, destruction) lives on
//! [`Entity`](super::Entity) itself.

use glam::{Quat, Vec2};
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::catalog::WeaponType;

// =============================================================================
// Pose
// =============================================================================

/// Position and orientation of an entity.
///
/// Positions live on the screen plane. The orientation is a full rotation so
/// that roll, pitch, and yaw produced by motion profiles survive for the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position on the screen plane.
    pub position: Vec2,
    /// Orientation.
    pub orientation: Quat,
}

impl Pose {
    /// Creates a pose at `position` with identity orientation.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

// =============================================================================
// Colliders and shields
// =============================================================================

/// Identifies one collider of one entity.
///
/// Part `0` is the entity's hull; composite enemies register sub-shields under
/// further part numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId {
    /// Owning entity.
    pub entity: EntityId,
    /// Part number within the entity.
    pub part: u16,
}

impl ColliderId {
    /// The hull collider of an entity.
    #[must_use]
    pub const fn hull(entity: EntityId) -> Self {
        Self { entity, part: 0 }
    }

    /// A sub-part collider of an entity.
    #[must_use]
    pub const fn part(entity: EntityId, part: u16) -> Self {
        Self { entity, part }
    }
}

/// A simple pool clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShieldPool {
    current: f32,
    max: f32,
}

impl ShieldPool {
    /// Creates a full pool.
    #[must_use]
    pub fn full(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Current value.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum value.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Absorbs as much of `amount` as the pool holds and returns the rest.
    pub fn absorb(&mut self, amount: f32) -> f32 {
        let absorbed = amount.min(self.current);
        self.current = (self.current - absorbed).clamp(0.0, self.max);
        amount - absorbed
    }

    /// Restores `amount`, capped at the maximum.
    pub fn restore(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }
}

/// Identifies a shield inside a [`CompositeShields`] set.
///
/// The id doubles as the collider part number of the shield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShieldId(pub u16);

impl ShieldId {
    /// The base shield, which covers the hull.
    pub const BASE: Self = Self(0);
}

/// One shield of a composite enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubShield {
    id: ShieldId,
    health: f32,
    max_health: f32,
    protectors: Vec<ShieldId>,
    active: bool,
}

impl SubShield {
    /// Creates an active shield with no protectors.
    #[must_use]
    pub fn new(id: ShieldId, health: f32) -> Self {
        Self {
            id,
            health,
            max_health: health,
            protectors: Vec::new(),
            active: health > 0.0,
        }
    }

    /// Adds shields that absorb damage aimed at this one first.
    #[must_use]
    pub fn protected_by(mut self, protectors: impl IntoIterator<Item = ShieldId>) -> Self {
        self.protectors.extend(protectors);
        self
    }

    /// Shield id.
    #[must_use]
    pub const fn id(&self) -> ShieldId {
        self.id
    }

    /// Remaining health, never negative.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health the shield started with.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Shields protecting this one.
    #[must_use]
    pub fn protectors(&self) -> &[ShieldId] {
        &self.protectors
    }

    /// Returns `true` while the shield still stands.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// The base shield of a composite enemy plus its registered sub-shields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeShields {
    base: SubShield,
    parts: Vec<SubShield>,
}

impl CompositeShields {
    /// Creates a composite from a base shield health and its sub-shields.
    ///
    /// Every sub-shield protects the base.
    #[must_use]
    pub fn new(base_health: f32, parts: Vec<SubShield>) -> Self {
        let base = SubShield::new(ShieldId::BASE, base_health)
            .protected_by(parts.iter().map(SubShield::id));
        Self { base, parts }
    }

    /// The base shield.
    #[must_use]
    pub const fn base(&self) -> &SubShield {
        &self.base
    }

    /// The registered sub-shields.
    #[must_use]
    pub fn parts(&self) -> &[SubShield] {
        &self.parts
    }

    /// Looks up a shield by id (the base included).
    #[must_use]
    pub fn get(&self, id: ShieldId) -> Option<&SubShield> {
        if id == ShieldId::BASE {
            return Some(&self.base);
        }
        self.parts.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: ShieldId) -> Option<&mut SubShield> {
        if id == ShieldId::BASE {
            return Some(&mut self.base);
        }
        self.parts.iter_mut().find(|s| s.id == id)
    }

    /// Returns `true` when the base is down and none of its protectors stands.
    #[must_use]
    pub fn is_breached(&self) -> bool {
        !self.base.active
            && self
                .base
                .protectors
                .iter()
                .all(|&p| self.get(p).map_or(true, |s| !s.active))
    }

    /// Applies damage to shield `id` and returns the overflow.
    ///
    /// Active protectors of the shield absorb the damage first; whatever they
    /// pass through is taken by the shield itself. Inactive shields absorb
    /// nothing. Unknown ids return the full amount.
    pub fn take_damage(&mut self, id: ShieldId, amount: f32) -> f32 {
        self.take_damage_bounded(id, amount, self.parts.len() + 1)
    }

    fn take_damage_bounded(&mut self, id: ShieldId, amount: f32, depth: usize) -> f32 {
        let Some(shield) = self.get(id) else {
            return amount;
        };
        let protectors = shield.protectors.clone();

        let mut remaining = amount;
        if depth > 0 {
            for protector in protectors {
                if self.get(protector).is_some_and(SubShield::is_active) {
                    remaining = self.take_damage_bounded(protector, remaining, depth - 1);
                    if remaining <= 0.0 {
                        return 0.0;
                    }
                }
            }
        }

        let Some(shield) = self.get_mut(id) else {
            return remaining;
        };
        if !shield.active {
            return remaining;
        }
        shield.health -= remaining;
        if shield.health <= 0.0 {
            let overflow = -shield.health;
            shield.health = 0.0;
            shield.active = false;
            return overflow;
        }
        0.0
    }
}

/// The player's shield-level counter.
///
/// Distinct from enemy sub-shields: each hostile contact costs one level, and
/// a contact at level zero destroys the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldLevel {
    level: u32,
    max: u32,
}

/// Result of a shield-level decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldHit {
    /// A level was lost; the player survives.
    Absorbed,
    /// The counter would have gone below zero.
    Depleted,
}

impl ShieldLevel {
    /// Creates a counter at `level`, clamped to `max`.
    #[must_use]
    pub fn new(level: u32, max: u32) -> Self {
        Self {
            level: level.min(max),
            max,
        }
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Configured maximum.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Raises the level by one, capped at the maximum.
    pub fn increment(&mut self) {
        self.level = (self.level + 1).min(self.max);
    }

    /// Lowers the level by one.
    pub fn decrement(&mut self) -> ShieldHit {
        match self.level.checked_sub(1) {
            Some(next) => {
                self.level = next.min(self.max);
                ShieldHit::Absorbed
            }
            None => ShieldHit::Depleted,
        }
    }
}

// =============================================================================
// Per-kind components
// =============================================================================

/// Components for the player-controlled hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroComponents {
    /// Shield-level counter.
    pub shield: ShieldLevel,
    /// Last entity whose contact was processed, to ignore repeated reports.
    pub last_trigger: Option<EntityId>,
}

impl HeroComponents {
    /// Creates hero components with the given shield level.
    #[must_use]
    pub fn new(shield: ShieldLevel) -> Self {
        Self {
            shield,
            last_trigger: None,
        }
    }
}

/// Components for enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyComponents {
    /// Hit points for non-composite enemies.
    pub health: f32,
    /// Optional primary shield pool absorbing damage before health.
    pub shield: Option<ShieldPool>,
    /// Composite shields; when present they replace `health`.
    pub composite: Option<CompositeShields>,
    /// Points awarded on destruction.
    pub score: u32,
    /// Probability in `[0, 1]` that destruction drops a reward.
    pub drop_chance: f32,
}

impl EnemyComponents {
    /// Creates a plain enemy with the given health.
    #[must_use]
    pub fn with_health(health: f32) -> Self {
        Self {
            health,
            shield: None,
            composite: None,
            score: 100,
            drop_chance: 1.0,
        }
    }

    /// Creates a composite enemy protected by `composite`.
    #[must_use]
    pub fn with_shields(composite: CompositeShields) -> Self {
        Self {
            health: composite.base().health(),
            shield: None,
            composite: Some(composite),
            score: 100,
            drop_chance: 1.0,
        }
    }

    /// Returns `true` if this enemy is protected by sub-shields.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        self.composite.is_some()
    }

    /// Effective health: the base shield for composites, hit points otherwise.
    #[must_use]
    pub fn effective_health(&self) -> f32 {
        self.composite
            .as_ref()
            .map_or(self.health, |c| c.base().health())
    }

    /// Returns `true` when the destruction threshold has been reached.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        match &self.composite {
            Some(composite) => composite.is_breached(),
            None => self.health <= 0.0,
        }
    }
}

/// Components for projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileComponents {
    /// Weapon that fired the projectile.
    pub weapon_type: WeaponType,
    /// Linear velocity at spawn.
    pub velocity: Vec2,
    /// Target bound by homing weapons.
    pub homing_target: Option<EntityId>,
}

/// Components for reward pickups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpComponents {
    /// What absorbing the pickup grants.
    pub reward: WeaponType,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod shield_pool_tests {
        use super::*;

        #[test]
        fn absorb_returns_overflow() {
            let mut pool = ShieldPool::full(5.0);
            assert_eq!(pool.absorb(3.0), 0.0);
            assert_eq!(pool.current(), 2.0);
            assert_eq!(pool.absorb(4.0), 2.0);
            assert_eq!(pool.current(), 0.0);
        }

        #[test]
        fn restore_is_capped() {
            let mut pool = ShieldPool::full(5.0);
            pool.absorb(1.0);
            pool.restore(10.0);
            assert_eq!(pool.current(), 5.0);
        }
    }

    mod composite_tests {
        use super::*;

        fn two_wings() -> CompositeShields {
            CompositeShields::new(
                10.0,
                vec![
                    SubShield::new(ShieldId(1), 4.0),
                    SubShield::new(ShieldId(2), 4.0),
                ],
            )
        }

        #[test]
        fn damage_to_sub_shield_stays_there() {
            let mut shields = two_wings();
            let overflow = shields.take_damage(ShieldId(1), 3.0);
            assert_eq!(overflow, 0.0);
            assert_eq!(shields.get(ShieldId(1)).unwrap().health(), 1.0);
            assert_eq!(shields.base().health(), 10.0);
        }

        #[test]
        fn base_damage_is_absorbed_by_protectors_first() {
            let mut shields = two_wings();
            shields.take_damage(ShieldId::BASE, 6.0);

            assert!(!shields.get(ShieldId(1)).unwrap().is_active());
            assert_eq!(shields.get(ShieldId(2)).unwrap().health(), 2.0);
            assert_eq!(shields.base().health(), 10.0);
        }

        #[test]
        fn breached_only_when_base_and_protectors_are_down() {
            let mut shields = two_wings();
            shields.take_damage(ShieldId::BASE, 8.0);
            assert!(!shields.is_breached());

            shields.take_damage(ShieldId::BASE, 10.0);
            assert!(shields.is_breached());
            assert_eq!(shields.base().health(), 0.0);
        }

        #[test]
        fn inactive_shield_absorbs_nothing() {
            let mut shields = two_wings();
            shields.take_damage(ShieldId(1), 10.0);
            assert_eq!(shields.take_damage(ShieldId(1), 2.0), 2.0);
        }

        #[test]
        fn cyclic_protectors_terminate() {
            let mut shields = CompositeShields::new(
                5.0,
                vec![
                    SubShield::new(ShieldId(1), 2.0).protected_by([ShieldId(2)]),
                    SubShield::new(ShieldId(2), 2.0).protected_by([ShieldId(1)]),
                ],
            );
            shields.take_damage(ShieldId(1), 100.0);
            assert!(!shields.get(ShieldId(1)).unwrap().is_active());
            assert!(!shields.get(ShieldId(2)).unwrap().is_active());
        }
    }

    mod shield_level_tests {
        use super::*;

        #[test]
        fn starts_clamped_to_max() {
            let shield = ShieldLevel::new(9, 4);
            assert_eq!(shield.level(), 4);
        }

        #[test]
        fn increment_is_capped() {
            let mut shield = ShieldLevel::new(3, 4);
            shield.increment();
            shield.increment();
            assert_eq!(shield.level(), 4);
        }

        #[test]
        fn decrement_past_zero_is_depleted() {
            let mut shield = ShieldLevel::new(1, 4);
            assert_eq!(shield.decrement(), ShieldHit::Absorbed);
            assert_eq!(shield.level(), 0);
            assert_eq!(shield.decrement(), ShieldHit::Depleted);
            assert_eq!(shield.level(), 0);
        }
    }

    mod enemy_tests {
        use super::*;

        #[test]
        fn plain_enemy_defeated_at_zero() {
            let mut enemy = EnemyComponents::with_health(3.0);
            assert!(!enemy.is_defeated());
            enemy.health = 0.0;
            assert!(enemy.is_defeated());
        }

        #[test]
        fn composite_reports_base_health() {
            let enemy = EnemyComponents::with_shields(CompositeShields::new(7.0, Vec::new()));
            assert!(enemy.is_composite());
            assert_eq!(enemy.effective_health(), 7.0);
        }
    }
}
