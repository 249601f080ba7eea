//! Collision resolution: damage, shields, destruction, and pickups.
//!
//! The [`DamageResolver`] turns each [`CollisionEvent`] delivered by the
//! external physics collaborator into state changes on the arena. Pairs are
//! classified by entity kind, in either order:
//!
//! - **Projectile × Enemy**: the projectile is consumed; an on-screen, alive
//!   enemy takes the weapon's damage through its shields.
//! - **Hero × Enemy**: the hero loses a shield level and the enemy is
//!   destroyed without reward.
//! - **Hero × PowerUp**: the pickup is consumed and absorbed.
//!
//! Every removal goes through the entity's
//! [`DestructionState`](crate::entity::DestructionState), so each entity is
//! destroyed and announced at most once, however many events hit it in a tick.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::catalog::{RewardTable, WeaponCatalog, WeaponType};
use crate::entity::{
    ColliderId, EnemyComponents, Entity, EntityId, EntityInner, EntityTag, Pose,
    PowerUpComponents, ShieldHit, ShieldId,
};
use crate::event::{Diagnostic, Event, StaleSource};

/// Which colliders touched, as reported by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactHint {
    /// Collider reported first by the contact.
    pub this_collider: ColliderId,
    /// Collider reported second by the contact.
    pub other_collider: ColliderId,
}

/// A collision between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// First entity.
    pub a: EntityId,
    /// Second entity.
    pub b: EntityId,
    /// Collider detail; without it, hits land on the hull.
    pub contact: Option<ContactHint>,
}

impl CollisionEvent {
    /// A collision with no collider detail.
    #[must_use]
    pub const fn between(a: EntityId, b: EntityId) -> Self {
        Self {
            a,
            b,
            contact: None,
        }
    }

    /// A collision between two specific colliders.
    #[must_use]
    pub const fn with_colliders(this_collider: ColliderId, other_collider: ColliderId) -> Self {
        Self {
            a: this_collider.entity,
            b: other_collider.entity,
            contact: Some(ContactHint {
                this_collider,
                other_collider,
            }),
        }
    }
}

/// Everything one collision produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveOutcome {
    /// State changes, in the order they happened.
    pub events: Vec<Event>,
    /// Inputs that were ignored.
    pub diagnostics: Vec<Diagnostic>,
    /// Weapon rewards the hero picked up; the caller feeds them to the hero's
    /// weapon controller.
    pub weapon_pickups: Vec<WeaponType>,
}

impl ResolveOutcome {
    fn stale(entity: EntityId) -> Self {
        tracing::debug!(%entity, "collision references a stale entity");
        Self {
            diagnostics: vec![Diagnostic::StaleEntity {
                entity,
                source: StaleSource::Collision,
            }],
            ..Self::default()
        }
    }

    /// Returns `true` if nothing happened and nothing was ignored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.diagnostics.is_empty() && self.weapon_pickups.is_empty()
    }
}

/// Resolves collision events against the arena.
#[derive(Debug, Clone)]
pub struct DamageResolver {
    catalog: Arc<WeaponCatalog>,
    rewards: RewardTable,
}

impl DamageResolver {
    /// Creates a resolver using `catalog` for damage values and `rewards` for
    /// drops.
    #[must_use]
    pub fn new(catalog: Arc<WeaponCatalog>, rewards: RewardTable) -> Self {
        Self { catalog, rewards }
    }

    /// Resolves one collision.
    ///
    /// Events referencing a missing entity, or an entity that is no longer
    /// alive where it would have to act, are ignored and reported as
    /// [`Diagnostic::StaleEntity`].
    pub fn on_collision<R: Rng + ?Sized>(
        &self,
        event: &CollisionEvent,
        arena: &mut Arena,
        rng: &mut R,
    ) -> ResolveOutcome {
        let Some(tag_a) = arena.get(event.a).map(Entity::tag) else {
            return ResolveOutcome::stale(event.a);
        };
        let Some(tag_b) = arena.get(event.b).map(Entity::tag) else {
            return ResolveOutcome::stale(event.b);
        };

        match (tag_a, tag_b) {
            (EntityTag::Projectile, EntityTag::Enemy) => {
                self.projectile_hit(event.a, event.b, event.contact, arena, rng)
            }
            (EntityTag::Enemy, EntityTag::Projectile) => {
                self.projectile_hit(event.b, event.a, event.contact, arena, rng)
            }
            (EntityTag::Hero, EntityTag::Enemy) => Self::hostile_contact(event.a, event.b, arena),
            (EntityTag::Enemy, EntityTag::Hero) => Self::hostile_contact(event.b, event.a, arena),
            (EntityTag::Hero, EntityTag::PowerUp) => Self::absorb(event.a, event.b, arena),
            (EntityTag::PowerUp, EntityTag::Hero) => Self::absorb(event.b, event.a, arena),
            (a, b) => {
                tracing::trace!(%a, %b, "collision pair ignored");
                ResolveOutcome {
                    diagnostics: vec![Diagnostic::IgnoredPair { a, b }],
                    ..ResolveOutcome::default()
                }
            }
        }
    }

    // =========================================================================
    // Projectile × Enemy
    // =========================================================================

    fn projectile_hit<R: Rng + ?Sized>(
        &self,
        projectile_id: EntityId,
        enemy_id: EntityId,
        contact: Option<ContactHint>,
        arena: &mut Arena,
        rng: &mut R,
    ) -> ResolveOutcome {
        let Some(projectile) = arena.get_mut(projectile_id) else {
            return ResolveOutcome::stale(projectile_id);
        };
        if !projectile.consume() {
            return ResolveOutcome::stale(projectile_id);
        }
        let weapon_type = projectile
            .as_projectile()
            .map_or(WeaponType::None, |p| p.weapon_type);

        let mut outcome = ResolveOutcome::default();
        let Some(enemy) = arena.get_mut(enemy_id).filter(|e| e.is_alive()) else {
            return ResolveOutcome::stale(enemy_id);
        };
        if !enemy.bounds_flags.is_on_screen() {
            tracing::trace!(%enemy_id, "hit on off-screen enemy; projectile consumed only");
            return outcome;
        }

        let amount = self.catalog.lookup(weapon_type).damage_on_hit;
        let struck = struck_shield(contact, projectile_id, enemy_id);
        let position = enemy.pose.position;
        let Some(components) = enemy.as_enemy_mut() else {
            return outcome;
        };
        apply_damage(components, struck, amount);
        let defeated = components.is_defeated();
        let (score, drop_chance) = (components.score, components.drop_chance);

        outcome.events.push(Event::DamageDealt {
            source: projectile_id,
            target: enemy_id,
            amount,
        });

        if defeated && enemy.begin_destruction() {
            tracing::info!(entity = %enemy_id, score, "enemy destroyed");
            outcome.events.push(Event::EntityDestroyed {
                entity: enemy_id,
                score,
                position,
            });
            if rng.gen::<f32>() <= drop_chance {
                outcome.events.push(self.drop_reward(position, arena, rng));
            }
        }
        outcome
    }

    fn drop_reward<R: Rng + ?Sized>(&self, position: Vec2, arena: &mut Arena, rng: &mut R) -> Event {
        let reward = self.rewards.choose(rng);
        let entity = arena.spawn(
            EntityTag::PowerUp,
            EntityInner::PowerUp(PowerUpComponents { reward }),
            Pose::at(position),
        );
        tracing::debug!(%entity, %reward, "reward dropped");
        Event::RewardSpawned {
            entity,
            reward,
            position,
        }
    }

    // =========================================================================
    // Hero contacts
    // =========================================================================

    fn hostile_contact(hero_id: EntityId, enemy_id: EntityId, arena: &mut Arena) -> ResolveOutcome {
        if arena.get_alive(enemy_id).is_none() {
            return ResolveOutcome::stale(enemy_id);
        }
        let Some(hero) = arena.get_mut(hero_id).filter(|h| h.is_alive()) else {
            return ResolveOutcome::stale(hero_id);
        };
        let Some(components) = hero.as_hero_mut() else {
            return ResolveOutcome::stale(hero_id);
        };
        if components.last_trigger == Some(enemy_id) {
            return repeated(enemy_id);
        }
        components.last_trigger = Some(enemy_id);

        let mut outcome = ResolveOutcome::default();
        match components.shield.decrement() {
            ShieldHit::Absorbed => {
                let shield_level = components.shield.level();
                tracing::debug!(%enemy_id, shield_level, "hero rammed");
                outcome.events.push(Event::HeroHit {
                    hero: hero_id,
                    enemy: enemy_id,
                    shield_level,
                });
            }
            ShieldHit::Depleted => {
                if hero.begin_destruction() {
                    tracing::info!(hero = %hero_id, "hero destroyed; game over");
                    outcome.events.push(Event::GameOver { hero: hero_id });
                }
            }
        }

        if let Some(enemy) = arena.get_mut(enemy_id) {
            enemy.begin_destruction();
        }
        outcome
    }

    fn absorb(hero_id: EntityId, power_up_id: EntityId, arena: &mut Arena) -> ResolveOutcome {
        let Some(reward) = arena
            .get_alive(power_up_id)
            .and_then(Entity::as_power_up)
            .map(|p| p.reward)
        else {
            return ResolveOutcome::stale(power_up_id);
        };
        let Some(hero) = arena
            .get_mut(hero_id)
            .filter(|h| h.is_alive())
            .and_then(Entity::as_hero_mut)
        else {
            return ResolveOutcome::stale(hero_id);
        };
        if hero.last_trigger == Some(power_up_id) {
            return repeated(power_up_id);
        }
        hero.last_trigger = Some(power_up_id);

        let mut outcome = ResolveOutcome::default();
        if reward == WeaponType::Shield {
            hero.shield.increment();
        } else {
            outcome.weapon_pickups.push(reward);
        }
        if let Some(power_up) = arena.get_mut(power_up_id) {
            power_up.consume();
        }

        tracing::debug!(%power_up_id, %reward, "power-up absorbed");
        outcome.events.push(Event::PowerUpAbsorbed {
            hero: hero_id,
            power_up: power_up_id,
            reward,
        });
        outcome
    }
}

fn repeated(entity: EntityId) -> ResolveOutcome {
    tracing::trace!(%entity, "repeated contact ignored");
    ResolveOutcome {
        diagnostics: vec![Diagnostic::RepeatedContact { entity }],
        ..ResolveOutcome::default()
    }
}

/// Picks the collider that was struck: `this_collider`, unless that is the
/// projectile's own, in which case `other_collider`.
fn struck_shield(
    contact: Option<ContactHint>,
    projectile: EntityId,
    enemy: EntityId,
) -> ShieldId {
    let Some(contact) = contact else {
        return ShieldId::BASE;
    };
    let struck = if contact.this_collider.entity == projectile {
        contact.other_collider
    } else {
        contact.this_collider
    };
    if struck.entity == enemy {
        ShieldId(struck.part)
    } else {
        ShieldId::BASE
    }
}

fn apply_damage(enemy: &mut EnemyComponents, struck: ShieldId, amount: f32) {
    if let Some(composite) = enemy.composite.as_mut() {
        let target = if composite.get(struck).is_some() {
            struck
        } else {
            ShieldId::BASE
        };
        composite.take_damage(target, amount);
        enemy.health = composite.base().health();
        return;
    }

    let remaining = match enemy.shield.as_mut() {
        Some(pool) => pool.absorb(amount),
        None => amount,
    };
    enemy.health = (enemy.health - remaining).max(0.0);
}
