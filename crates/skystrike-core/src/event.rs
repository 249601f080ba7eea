//! Events and diagnostics emitted by a tick.
//!
//! Events describe state changes a presentation layer reacts to (spawns,
//! destruction, rewards, game over). Diagnostics record inputs the simulation
//! chose to ignore; they never change state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::WeaponType;
use crate::entity::{EntityId, EntityTag};
use crate::spawner::EnemyKind;

/// A state change produced during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// An enemy entered play.
    EnemySpawned {
        /// The new enemy.
        entity: EntityId,
        /// Which prototype it was built from.
        kind: EnemyKind,
    },
    /// A weapon slot spawned a projectile.
    ProjectileSpawned {
        /// The new projectile.
        entity: EntityId,
        /// Weapon that fired it.
        weapon_type: WeaponType,
        /// Slot that fired it.
        slot: usize,
    },
    /// A projectile damaged an enemy.
    DamageDealt {
        /// Projectile that hit.
        source: EntityId,
        /// Enemy that was hit.
        target: EntityId,
        /// Damage applied.
        amount: f32,
    },
    /// An enemy reached its destruction threshold. Emitted once per entity.
    EntityDestroyed {
        /// The destroyed entity.
        entity: EntityId,
        /// Points awarded.
        score: u32,
        /// Last position of the entity.
        position: Vec2,
    },
    /// A reward pickup was dropped.
    RewardSpawned {
        /// The new pickup.
        entity: EntityId,
        /// What it grants.
        reward: WeaponType,
        /// Where it was dropped.
        position: Vec2,
    },
    /// The hero collided with an enemy and lost a shield level.
    HeroHit {
        /// The hero.
        hero: EntityId,
        /// The enemy that rammed it.
        enemy: EntityId,
        /// Shield level after the hit.
        shield_level: u32,
    },
    /// The hero picked up a reward.
    PowerUpAbsorbed {
        /// The hero.
        hero: EntityId,
        /// The pickup that was consumed.
        power_up: EntityId,
        /// What it granted.
        reward: WeaponType,
    },
    /// An entity's motion ended (lifetime over, left the screen, lost its target).
    EntityExpired {
        /// The expired entity.
        entity: EntityId,
        /// Its kind.
        tag: EntityTag,
    },
    /// The hero was destroyed. Emitted once per session.
    GameOver {
        /// The hero.
        hero: EntityId,
    },
}

impl Event {
    /// Returns the primary entity involved in this event.
    #[must_use]
    pub const fn primary_entity(&self) -> EntityId {
        match self {
            Self::EnemySpawned { entity, .. }
            | Self::ProjectileSpawned { entity, .. }
            | Self::EntityDestroyed { entity, .. }
            | Self::RewardSpawned { entity, .. }
            | Self::EntityExpired { entity, .. } => *entity,
            Self::DamageDealt { target, .. } => *target,
            Self::HeroHit { hero, .. }
            | Self::PowerUpAbsorbed { hero, .. }
            | Self::GameOver { hero } => *hero,
        }
    }

    /// Returns `true` for destruction notifications.
    #[must_use]
    pub const fn is_destruction(&self) -> bool {
        matches!(self, Self::EntityDestroyed { .. })
    }
}

/// Where a stale reference was encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaleSource {
    /// A collision event.
    Collision,
    /// A homing projectile's target.
    HomingTarget,
}

/// An input the simulation ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// An input referenced an entity that is missing or no longer alive.
    StaleEntity {
        /// The referenced entity.
        entity: EntityId,
        /// Where the reference came from.
        source: StaleSource,
    },
    /// A collision between kinds that do not interact.
    IgnoredPair {
        /// Kind of the first entity.
        a: EntityTag,
        /// Kind of the second entity.
        b: EntityTag,
    },
    /// A repeated contact report from the hero's last trigger.
    RepeatedContact {
        /// The entity that touched the hero again.
        entity: EntityId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_entity_per_variant() {
        let id = EntityId::new(3);
        let events = [
            Event::EntityDestroyed {
                entity: id,
                score: 100,
                position: Vec2::ZERO,
            },
            Event::DamageDealt {
                source: EntityId::new(9),
                target: id,
                amount: 1.0,
            },
            Event::GameOver { hero: id },
        ];
        assert!(events.iter().all(|e| e.primary_entity() == id));
        assert!(events[0].is_destruction());
        assert!(!events[2].is_destruction());
    }

    #[test]
    fn diagnostics_serialize() {
        let diag = Diagnostic::StaleEntity {
            entity: EntityId::new(5),
            source: StaleSource::Collision,
        };
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }
}
