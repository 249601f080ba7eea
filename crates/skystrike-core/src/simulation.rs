//! Simulation module with the per-tick phase loop.
//!
//! The `Simulation` struct owns the arena and every subsystem, and advances
//! them through a fixed sequence of phases on each [`Simulation::step`]:
//!
//! 1. **SPAWN**: the enemy spawner places at most one enemy
//! 2. **STEER**: the hero moves from the input axes
//! 3. **BOUNDS**: every bounded entity is clamped and flagged
//! 4. **MOTION**: every motion profile advances; expired entities are marked
//! 5. **COLLIDE**: collision events are resolved in delivery order
//! 6. **FIRE**: a held trigger fires every weapon slot in slot order
//! 7. **SWEEP**: entities that left play are removed; the tick advances
//!
//! Entities that stop being alive during a phase are skipped by every later
//! phase of the same tick.
//!
//! Once the hero is destroyed the session keeps ticking so in-flight
//! entities play out, but the spawner stops placing enemies.
//!
//! # Determinism
//!
//! Every random choice draws from one `ChaCha8Rng` seeded from the session
//! config, and entities are visited in ID order. The same seed and the same
//! inputs therefore produce identical reports.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use skystrike_core::catalog::{RewardTable, WeaponCatalog};
//! use skystrike_core::config::SimulationConfig;
//! use skystrike_core::simulation::{Simulation, TickInput};
//!
//! let mut sim = Simulation::new(
//!     SimulationConfig::default(),
//!     Arc::new(WeaponCatalog::standard()),
//!     RewardTable::standard(),
//! )
//! .unwrap();
//!
//! for i in 0..10u8 {
//!     sim.step(&TickInput::idle(f32::from(i) * 0.1, 0.1));
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! ```

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::bounds::{BoundsBinding, BoundsMode, BoundsTracker};
use crate::catalog::{RewardTable, WeaponCatalog};
use crate::config::{SetupError, SimulationConfig};
use crate::damage::{CollisionEvent, DamageResolver};
use crate::entity::{Entity, EntityId, EntityInner, ProjectileComponents};
use crate::event::{Diagnostic, Event, StaleSource};
use crate::hero::{HeroControl, MovementInput};
use crate::motion::MotionContext;
use crate::spawner::EnemySpawner;
use crate::weapon::{FireContext, ProjectileSpawn};

// =============================================================================
// Tick input and report
// =============================================================================

/// Everything the outside world supplies for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Clock sample, in seconds; must not decrease between ticks.
    pub now: f32,
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Collisions reported by physics, in delivery order.
    pub collisions: Vec<CollisionEvent>,
    /// Fire trigger held.
    pub fire: bool,
    /// Movement axes.
    pub movement: MovementInput,
}

impl TickInput {
    /// A tick with no collisions, no movement, and the trigger released.
    #[must_use]
    pub fn idle(now: f32, dt: f32) -> Self {
        Self {
            now,
            dt,
            ..Self::default()
        }
    }

    /// The same tick with the trigger held.
    #[must_use]
    pub fn firing(mut self) -> Self {
        self.fire = true;
        self
    }

    /// The same tick with `collisions` delivered.
    #[must_use]
    pub fn with_collisions(mut self, collisions: Vec<CollisionEvent>) -> Self {
        self.collisions = collisions;
        self
    }

    /// The same tick with movement axes.
    #[must_use]
    pub fn moving(mut self, movement: MovementInput) -> Self {
        self.movement = movement;
        self
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number the report belongs to.
    pub tick: u64,
    /// State changes in the order they happened.
    pub events: Vec<Event>,
    /// Inputs that were ignored.
    pub diagnostics: Vec<Diagnostic>,
    /// Entities removed by the end-of-tick sweep, in ID order.
    pub removed: Vec<EntityId>,
}

impl TickReport {
    fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Entities announced as destroyed this tick.
    pub fn destroyed(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::EntityDestroyed { entity, .. } => Some(*entity),
            _ => None,
        })
    }

    /// Points scored this tick.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.events
            .iter()
            .map(|e| match e {
                Event::EntityDestroyed { score, .. } => *score,
                _ => 0,
            })
            .sum()
    }

    /// Returns `true` if the hero was destroyed this tick.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.events.iter().any(|e| matches!(e, Event::GameOver { .. }))
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// The per-tick orchestrator.
#[derive(Debug)]
pub struct Simulation {
    arena: Arena,
    bounds: BoundsTracker,
    spawner: EnemySpawner,
    hero: HeroControl,
    hero_id: EntityId,
    resolver: DamageResolver,
    catalog: Arc<WeaponCatalog>,
    rng: ChaCha8Rng,
    seed: u64,
    projectile_radius: f32,
    game_over: bool,
}

impl Simulation {
    /// Creates a session and spawns the hero.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] if `config` fails validation and
    /// [`SetupError::Catalog`] if the reward table or the hero's starting
    /// weapon names a weapon missing from `catalog`.
    pub fn new(
        config: SimulationConfig,
        catalog: Arc<WeaponCatalog>,
        rewards: RewardTable,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let rewards = RewardTable::new(rewards.frequency().to_vec(), &catalog)?;
        catalog.ensure_mapped(config.hero.starting_weapon)?;

        let mut arena = Arena::new();
        let hero = HeroControl::new(config.hero, Arc::clone(&catalog), config.patterns);
        let hero_id = hero.spawn(&mut arena);

        tracing::debug!(seed = config.seed, %hero_id, "session created");
        Ok(Self {
            arena,
            bounds: BoundsTracker::new(config.extents),
            spawner: EnemySpawner::new(config.spawner, config.extents),
            hero,
            hero_id,
            resolver: DamageResolver::new(Arc::clone(&catalog), rewards),
            catalog,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            seed: config.seed,
            projectile_radius: config.projectile_radius,
            game_over: false,
        })
    }

    /// Advances the session by one tick.
    pub fn step(&mut self, input: &TickInput) -> TickReport {
        let mut report = TickReport::new(self.arena.current_tick());

        if !self.game_over {
            if let Some(spawned) = self.spawner.tick(input.now, &mut self.arena, &mut self.rng) {
                report.events.push(Event::EnemySpawned {
                    entity: spawned.entity,
                    kind: spawned.kind,
                });
            }
        }

        self.steer_hero(input);
        self.update_bounds();
        self.advance_motion(input, &mut report);

        for collision in &input.collisions {
            let outcome = self
                .resolver
                .on_collision(collision, &mut self.arena, &mut self.rng);
            for &weapon_type in &outcome.weapon_pickups {
                self.hero.absorb_weapon(weapon_type);
            }
            report.events.extend(outcome.events);
            report.diagnostics.extend(outcome.diagnostics);
        }

        if input.fire {
            self.fire(input.now, &mut report);
        }

        report.removed = self.arena.sweep();
        self.arena.advance_tick();

        if report.game_over() {
            self.game_over = true;
        }
        tracing::trace!(
            tick = report.tick,
            events = report.events.len(),
            removed = report.removed.len(),
            "tick complete"
        );
        report
    }

    fn update_bounds(&mut self) {
        let tracker = self.bounds;
        for entity in self.arena.entities_sorted_mut() {
            if !entity.is_alive() {
                continue;
            }
            let Some(binding) = entity.bounds else {
                continue;
            };
            let outcome = tracker.evaluate(entity.pose.position, &binding);
            entity.pose.position = outcome.position;
            entity.bounds_flags = outcome.flags;
        }
    }

    fn steer_hero(&mut self, input: &TickInput) {
        let Some(entity) = self.arena.get_mut(self.hero_id) else {
            return;
        };
        if entity.is_alive() {
            entity.pose = self.hero.steer(entity.pose, input.movement, input.dt);
        }
    }

    fn advance_motion(&mut self, input: &TickInput, report: &mut TickReport) {
        let moving: Vec<EntityId> = self
            .arena
            .entities_sorted()
            .filter(|e| e.is_alive() && e.motion.is_some())
            .map(Entity::id)
            .collect();

        for id in moving {
            let homing = self
                .arena
                .get(id)
                .and_then(|e| e.motion.as_ref())
                .and_then(|m| m.homing_target());
            let target = homing.and_then(|t| self.arena.get_alive(t).map(|e| e.pose.position));
            if let (Some(lost), None) = (homing, target) {
                tracing::debug!(%id, target = %lost, "homing target lost");
                report.diagnostics.push(Diagnostic::StaleEntity {
                    entity: lost,
                    source: StaleSource::HomingTarget,
                });
            }

            let Some(entity) = self.arena.get_mut(id) else {
                continue;
            };
            let ctx = MotionContext {
                now: input.now,
                dt: input.dt,
                pose: entity.pose,
                bounds: entity.bounds_flags,
                target,
            };
            let Some(motion) = entity.motion.as_mut() else {
                continue;
            };
            let step = motion.advance(&ctx, &mut self.rng);
            entity.pose = step.pose;
            if step.expired && entity.expire() {
                report.events.push(Event::EntityExpired {
                    entity: id,
                    tag: entity.tag(),
                });
            }
        }
    }

    fn fire(&mut self, now: f32, report: &mut TickReport) {
        let Some(hero) = self.arena.get_alive(self.hero_id) else {
            return;
        };
        let muzzle = self.hero.muzzle(&hero.pose);
        let targets = self.arena.live_targets();
        let mut ctx = FireContext {
            now,
            muzzle,
            targets: &targets,
            rng: &mut self.rng,
        };
        let spawns = self.hero.weapons_mut().fire_all(&mut ctx);

        for spawn in spawns {
            let (weapon_type, slot) = (spawn.weapon_type, spawn.slot);
            let entity = self.spawn_projectile(spawn);
            report.events.push(Event::ProjectileSpawned {
                entity,
                weapon_type,
                slot,
            });
        }
    }

    fn spawn_projectile(&mut self, spawn: ProjectileSpawn) -> EntityId {
        let components = ProjectileComponents {
            weapon_type: spawn.weapon_type,
            velocity: spawn.velocity,
            homing_target: spawn.homing_target,
        };
        let bounds = BoundsBinding::free(self.projectile_radius, BoundsMode::Center);
        self.arena.spawn_with(|id| {
            Entity::new(id, EntityInner::Projectile(components), spawn.pose)
                .with_bounds(bounds)
                .with_motion(spawn.motion)
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns a reference to the arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns a mutable reference to the arena, for external spawns.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Returns the current tick number.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Returns the session seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The hero's entity ID.
    #[must_use]
    pub fn hero_id(&self) -> EntityId {
        self.hero_id
    }

    /// The hero's controller and weapons.
    #[must_use]
    pub fn hero(&self) -> &HeroControl {
        &self.hero
    }

    /// Mutable access to the hero's controller, for loadout changes.
    #[must_use]
    pub fn hero_mut(&mut self) -> &mut HeroControl {
        &mut self.hero
    }

    /// The shared weapon catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<WeaponCatalog> {
        &self.catalog
    }

    /// Returns `true` once the hero has been destroyed.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WeaponType;
    use crate::config::ConfigError;
    use crate::entity::{EnemyComponents, EntityTag, Pose};
    use crate::spawner::SpawnerConfig;
    use glam::Vec2;

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            spawner: SpawnerConfig {
                enabled: false,
                ..SpawnerConfig::default()
            },
            ..SimulationConfig::default()
        }
    }

    fn sim(config: SimulationConfig) -> Simulation {
        Simulation::new(
            config,
            Arc::new(WeaponCatalog::standard()),
            RewardTable::standard(),
        )
        .unwrap()
    }

    mod creation_tests {
        use super::*;

        #[test]
        fn new_spawns_hero_at_tick_zero() {
            let sim = sim(quiet_config());
            assert_eq!(sim.tick(), 0);
            assert!(sim.arena().get(sim.hero_id()).unwrap().is_hero());
            assert!(!sim.is_game_over());
        }

        #[test]
        fn invalid_config_is_rejected() {
            let mut config = quiet_config();
            config.hero.weapon_slots = 0;
            let err = Simulation::new(
                config,
                Arc::new(WeaponCatalog::standard()),
                RewardTable::standard(),
            )
            .unwrap_err();
            assert_eq!(err, SetupError::Config(ConfigError::NoWeaponSlots));
        }

        #[test]
        fn reward_missing_from_catalog_is_rejected() {
            let catalog = WeaponCatalog::new([]).unwrap();
            let mut config = quiet_config();
            config.hero.starting_weapon = WeaponType::None;
            let err = Simulation::new(config, Arc::new(catalog), RewardTable::standard()).unwrap_err();
            assert!(matches!(err, SetupError::Catalog(_)));
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn step_advances_tick_and_stamps_report() {
            let mut sim = sim(quiet_config());
            let first = sim.step(&TickInput::idle(0.0, 0.1));
            let second = sim.step(&TickInput::idle(0.1, 0.1));
            assert_eq!(first.tick, 0);
            assert_eq!(second.tick, 1);
            assert_eq!(sim.tick(), 2);
        }

        #[test]
        fn hero_is_kept_on_screen() {
            let mut sim = sim(quiet_config());
            for i in 0..5u8 {
                let input = TickInput::idle(f32::from(i), 1.0).moving(MovementInput::new(1.0, 0.0));
                sim.step(&input);
                let hero = sim.arena().get(sim.hero_id()).unwrap();
                assert!(hero.pose.position.x <= 26.0);
            }
            let hero = sim.arena().get(sim.hero_id()).unwrap();
            assert_eq!(hero.pose.position.x, 26.0);
            assert!(hero.bounds_flags.is_on_screen());
        }

        #[test]
        fn firing_spawns_projectiles_that_leave_the_top() {
            let mut config = quiet_config();
            config.hero.starting_weapon = WeaponType::Blaster;
            let mut sim = sim(config);

            let report = sim.step(&TickInput::idle(0.0, 0.1).firing());
            let spawned: Vec<EntityId> = report
                .events
                .iter()
                .filter_map(|e| match e {
                    Event::ProjectileSpawned { entity, .. } => Some(*entity),
                    _ => None,
                })
                .collect();
            assert_eq!(spawned.len(), 1);

            let mut expired = false;
            for i in 1..40u8 {
                let report = sim.step(&TickInput::idle(f32::from(i) * 0.1, 0.1));
                expired |= report.removed.contains(&spawned[0]);
            }
            assert!(expired);
            assert!(sim.arena().get(spawned[0]).is_none());
        }

        #[test]
        fn collision_kills_enemy_and_drops_reward() {
            let mut config = quiet_config();
            config.hero.starting_weapon = WeaponType::Blaster;
            let mut sim = sim(config);

            let mut components = EnemyComponents::with_health(1.0);
            components.score = 250;
            let enemy = sim.arena_mut().spawn(
                EntityTag::Enemy,
                EntityInner::Enemy(components),
                Pose::at(Vec2::new(0.0, 10.0)),
            );
            let report = sim.step(&TickInput::idle(0.0, 0.1).firing());
            let shot = report.events[0].primary_entity();

            let report = sim.step(
                &TickInput::idle(0.1, 0.1).with_collisions(vec![CollisionEvent::between(shot, enemy)]),
            );

            assert_eq!(report.destroyed().collect::<Vec<_>>(), vec![enemy]);
            assert_eq!(report.score(), 250);
            assert!(report.removed.contains(&enemy));
            assert!(report.removed.contains(&shot));
            assert_eq!(sim.arena().count_alive(EntityTag::PowerUp), 1);
        }

        #[test]
        fn weapon_pickup_reaches_hero_loadout() {
            let mut sim = sim(quiet_config());
            let pickup = sim.arena_mut().spawn(
                EntityTag::PowerUp,
                EntityInner::PowerUp(crate::entity::PowerUpComponents {
                    reward: WeaponType::Spread,
                }),
                Pose::default(),
            );
            let hero = sim.hero_id();
            let touch = vec![CollisionEvent::between(hero, pickup)];
            sim.step(&TickInput::idle(0.0, 0.1).with_collisions(touch));
            assert_eq!(sim.hero().weapons().slots()[0].weapon_type(), WeaponType::Spread);
        }

        #[test]
        fn game_over_latches() {
            let mut config = quiet_config();
            config.hero.shield_start = 0;
            let mut sim = sim(config);
            let hero = sim.hero_id();
            let enemy = sim.arena_mut().spawn(
                EntityTag::Enemy,
                EntityInner::Enemy(EnemyComponents::with_health(10.0)),
                Pose::default(),
            );
            let ram = vec![CollisionEvent::between(enemy, hero)];
            let report = sim.step(&TickInput::idle(0.0, 0.1).with_collisions(ram));
            assert!(report.game_over());
            assert!(sim.is_game_over());
            assert!(sim.arena().get(hero).is_none());

            // Firing after the hero is gone does nothing.
            let report = sim.step(&TickInput::idle(0.1, 0.1).firing());
            assert!(report.events.is_empty());
        }
    }
}
