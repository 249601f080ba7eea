//! Enemy spawn cadence, prototypes, and placement.
//!
//! The [`EnemySpawner`] places one enemy per cadence interval just above the
//! top edge of the screen, at a random horizontal position pulled in from the
//! sides by the enemy's radius. Each spawn draws one [`EnemyPrototype`]
//! uniformly from the configured list; the prototype decides health, shields,
//! reward odds, and which motion profile drives the enemy.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::bounds::{BoundsBinding, BoundsMode, ScreenExtents};
use crate::entity::{
    CompositeShields, EnemyComponents, Entity, EntityId, EntityInner, Pose, ShieldId, SubShield,
};
use crate::motion::{
    LinearDescent, MotionProfile, RepeatingWaypointEase, SweepTuning, TwoPointWaypointSine,
};

/// Enemy families, named by how they move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Falls straight down the screen.
    Descender,
    /// Sweeps across the screen once.
    Sweeper,
    /// Hops between on-screen waypoints forever.
    Hopper,
}

/// Motion assigned to an enemy at spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyMotion {
    /// Straight down at `speed`.
    Descend {
        /// Units per second.
        speed: f32,
    },
    /// One side-to-side sweep.
    Sweep(SweepTuning),
    /// Eased waypoint hops of `duration` seconds each.
    Hop {
        /// Seconds per hop.
        duration: f32,
    },
}

impl EnemyMotion {
    /// Named values that must be strictly positive.
    #[must_use]
    pub fn durations(&self) -> Vec<(&'static str, f32)> {
        match self {
            Self::Descend { speed } => vec![("descend.speed", *speed)],
            Self::Sweep(tuning) => vec![("sweep.lifetime", tuning.lifetime)],
            Self::Hop { duration } => vec![("hop.duration", *duration)],
        }
    }
}

/// A sub-shield of a composite prototype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubShieldSpec {
    /// Shield id, also its collider part number. Must not be 0.
    pub id: u16,
    /// Starting health.
    pub health: f32,
    /// Ids of the shields protecting this one.
    #[serde(default)]
    pub protectors: Vec<u16>,
}

/// Template for one enemy family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyPrototype {
    /// How the enemy moves.
    pub motion: EnemyMotion,
    /// Hit points; the base shield health for composites.
    pub health: f32,
    /// Points awarded on destruction.
    pub score: u32,
    /// Probability of dropping a reward.
    pub drop_chance: f32,
    /// Bounds radius; `None` leaves the enemy unbounded.
    pub radius: Option<f32>,
    /// Sub-shields; a non-empty list makes the enemy composite.
    #[serde(default)]
    pub sub_shields: Vec<SubShieldSpec>,
}

impl EnemyPrototype {
    /// A descender: 10 health, speed 10.
    #[must_use]
    pub fn descender() -> Self {
        Self {
            motion: EnemyMotion::Descend { speed: 10.0 },
            health: 10.0,
            score: 100,
            drop_chance: 1.0,
            radius: Some(2.5),
            sub_shields: Vec::new(),
        }
    }

    /// A sweeper: crosses the screen once over ten seconds.
    #[must_use]
    pub fn sweeper() -> Self {
        Self {
            motion: EnemyMotion::Sweep(SweepTuning::default()),
            health: 10.0,
            score: 100,
            drop_chance: 1.0,
            radius: Some(3.0),
            sub_shields: Vec::new(),
        }
    }

    /// A shielded hopper: a core protected by two wings and a cockpit that the
    /// wings protect.
    #[must_use]
    pub fn fortress() -> Self {
        Self {
            motion: EnemyMotion::Hop {
                duration: RepeatingWaypointEase::DEFAULT_DURATION,
            },
            health: 10.0,
            score: 100,
            drop_chance: 1.0,
            radius: Some(3.5),
            sub_shields: vec![
                SubShieldSpec {
                    id: 1,
                    health: 4.0,
                    protectors: Vec::new(),
                },
                SubShieldSpec {
                    id: 2,
                    health: 4.0,
                    protectors: Vec::new(),
                },
                SubShieldSpec {
                    id: 3,
                    health: 6.0,
                    protectors: vec![1, 2],
                },
            ],
        }
    }

    /// The family this prototype belongs to.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        match self.motion {
            EnemyMotion::Descend { .. } => EnemyKind::Descender,
            EnemyMotion::Sweep(_) => EnemyKind::Sweeper,
            EnemyMotion::Hop { .. } => EnemyKind::Hopper,
        }
    }

    /// Builds the enemy components.
    #[must_use]
    pub fn components(&self) -> EnemyComponents {
        let mut components = if self.sub_shields.is_empty() {
            EnemyComponents::with_health(self.health)
        } else {
            let parts = self
                .sub_shields
                .iter()
                .map(|s| {
                    SubShield::new(ShieldId(s.id), s.health)
                        .protected_by(s.protectors.iter().copied().map(ShieldId))
                })
                .collect();
            EnemyComponents::with_shields(CompositeShields::new(self.health, parts))
        };
        components.score = self.score;
        components.drop_chance = self.drop_chance;
        components
    }
}

/// Spawner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// When false the cadence keeps running but nothing spawns.
    pub enabled: bool,
    /// Enemies per second.
    pub per_second: f32,
    /// Inset from the screen sides for enemies without a bounds radius.
    pub inset_default: f32,
    /// Prototypes drawn from uniformly.
    pub prototypes: Vec<EnemyPrototype>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_second: 0.5,
            inset_default: 1.5,
            prototypes: vec![
                EnemyPrototype::descender(),
                EnemyPrototype::sweeper(),
                EnemyPrototype::fortress(),
            ],
        }
    }
}

/// An enemy the spawner just placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedEnemy {
    /// The new entity.
    pub entity: EntityId,
    /// Its family.
    pub kind: EnemyKind,
}

/// Places enemies on a fixed cadence.
#[derive(Debug, Clone)]
pub struct EnemySpawner {
    config: SpawnerConfig,
    extents: ScreenExtents,
    next_spawn_at: Option<f32>,
}

impl EnemySpawner {
    /// Creates a spawner; the first enemy is due one interval after the first
    /// tick.
    #[must_use]
    pub fn new(config: SpawnerConfig, extents: ScreenExtents) -> Self {
        Self {
            config,
            extents,
            next_spawn_at: None,
        }
    }

    /// Clock time the next enemy is due, once the cadence has started.
    #[must_use]
    pub const fn next_spawn_at(&self) -> Option<f32> {
        self.next_spawn_at
    }

    fn interval(&self) -> f32 {
        1.0 / self.config.per_second
    }

    /// Spawns at most one enemy if the cadence is due at `now`.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        now: f32,
        arena: &mut Arena,
        rng: &mut R,
    ) -> Option<SpawnedEnemy> {
        let interval = self.interval();
        let due = *self.next_spawn_at.get_or_insert(now + interval);
        if now < due {
            return None;
        }
        self.next_spawn_at = Some(now + interval);

        if !self.config.enabled || self.config.prototypes.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.config.prototypes.len());
        let prototype = &self.config.prototypes[index];
        let entity = self.place(prototype, now, arena, rng);
        let kind = prototype.kind();
        tracing::debug!(%entity, ?kind, "enemy spawned");
        Some(SpawnedEnemy { entity, kind })
    }

    fn place<R: Rng + ?Sized>(
        &self,
        prototype: &EnemyPrototype,
        now: f32,
        arena: &mut Arena,
        rng: &mut R,
    ) -> EntityId {
        let extents = self.extents;
        let inset = prototype.radius.map_or(self.config.inset_default, f32::abs);
        let x_limit = extents.half_width - inset;
        let x = if x_limit > 0.0 {
            rng.gen_range(-x_limit..x_limit)
        } else {
            0.0
        };
        let start = Vec2::new(x, extents.half_height + inset);

        let radius = prototype.radius.unwrap_or(0.0);
        let (pose, motion) = match &prototype.motion {
            EnemyMotion::Descend { speed } => (
                Pose::at(start),
                MotionProfile::LinearDescent(LinearDescent::downward(*speed)),
            ),
            EnemyMotion::Sweep(tuning) => {
                let (sweep, pose) =
                    TwoPointWaypointSine::spawn(extents, radius, now, tuning.clone(), rng);
                (pose, MotionProfile::TwoPointWaypointSine(sweep))
            }
            EnemyMotion::Hop { duration } => (
                Pose::at(start),
                MotionProfile::RepeatingWaypointEase(RepeatingWaypointEase::spawn(
                    start, extents, radius, now, *duration, rng,
                )),
            ),
        };

        let components = prototype.components();
        let bounds = prototype
            .radius
            .map(|r| BoundsBinding::free(r, BoundsMode::Outset));
        arena.spawn_with(|id| {
            let mut entity = Entity::new(id, EntityInner::Enemy(components), pose).with_motion(motion);
            entity.bounds = bounds;
            entity
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn extents() -> ScreenExtents {
        ScreenExtents::new(30.0, 40.0)
    }

    fn only(prototype: EnemyPrototype) -> SpawnerConfig {
        SpawnerConfig {
            prototypes: vec![prototype],
            ..SpawnerConfig::default()
        }
    }

    mod cadence_tests {
        use super::*;

        #[test]
        fn first_spawn_waits_one_interval() {
            let mut spawner = EnemySpawner::new(SpawnerConfig::default(), extents());
            let mut arena = Arena::new();
            let mut rng = ChaCha8Rng::seed_from_u64(3);

            assert!(spawner.tick(0.0, &mut arena, &mut rng).is_none());
            assert_eq!(spawner.next_spawn_at(), Some(2.0));
            assert!(spawner.tick(1.9, &mut arena, &mut rng).is_none());
            assert!(spawner.tick(2.0, &mut arena, &mut rng).is_some());
            assert_eq!(spawner.next_spawn_at(), Some(4.0));
            assert_eq!(arena.entity_count(), 1);
        }

        #[test]
        fn at_most_one_spawn_per_tick() {
            let mut spawner = EnemySpawner::new(SpawnerConfig::default(), extents());
            let mut arena = Arena::new();
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            spawner.tick(0.0, &mut arena, &mut rng);
            assert!(spawner.tick(100.0, &mut arena, &mut rng).is_some());
            assert_eq!(arena.entity_count(), 1);
        }

        #[test]
        fn disabled_spawner_keeps_cadence_without_spawning() {
            let config = SpawnerConfig {
                enabled: false,
                ..SpawnerConfig::default()
            };
            let mut spawner = EnemySpawner::new(config, extents());
            let mut arena = Arena::new();
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            spawner.tick(0.0, &mut arena, &mut rng);
            assert!(spawner.tick(2.0, &mut arena, &mut rng).is_none());
            assert_eq!(spawner.next_spawn_at(), Some(4.0));
            assert!(arena.is_empty());
        }
    }

    mod placement_tests {
        use super::*;

        #[test]
        fn descenders_start_above_screen_inside_sides() {
            let mut spawner = EnemySpawner::new(only(EnemyPrototype::descender()), extents());
            let mut arena = Arena::new();
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            spawner.tick(0.0, &mut arena, &mut rng);
            for i in 1..=50u8 {
                let now = f32::from(i) * 2.0;
                let spawned = spawner.tick(now, &mut arena, &mut rng).unwrap();
                assert_eq!(spawned.kind, EnemyKind::Descender);
                let pos = arena.get(spawned.entity).unwrap().pose.position;
                assert!(pos.x.abs() <= 27.5);
                assert_eq!(pos.y, 42.5);
            }
        }

        #[test]
        fn sweeper_starts_at_its_first_waypoint() {
            let mut spawner = EnemySpawner::new(only(EnemyPrototype::sweeper()), extents());
            let mut arena = Arena::new();
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            spawner.tick(0.0, &mut arena, &mut rng);
            let spawned = spawner.tick(2.0, &mut arena, &mut rng).unwrap();
            let entity = arena.get(spawned.entity).unwrap();
            let Some(MotionProfile::TwoPointWaypointSine(sweep)) = &entity.motion else {
                panic!("expected a sweep, got {:?}", entity.motion);
            };
            assert_eq!(entity.pose.position, sweep.p0);
            assert_eq!(sweep.p0.x.abs(), 33.0);
        }

        #[test]
        fn fortress_is_composite_and_bounded() {
            let mut spawner = EnemySpawner::new(only(EnemyPrototype::fortress()), extents());
            let mut arena = Arena::new();
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            spawner.tick(0.0, &mut arena, &mut rng);
            let spawned = spawner.tick(2.0, &mut arena, &mut rng).unwrap();
            let entity = arena.get(spawned.entity).unwrap();
            let enemy = entity.as_enemy().unwrap();

            assert_eq!(spawned.kind, EnemyKind::Hopper);
            assert!(enemy.is_composite());
            assert_eq!(enemy.composite.as_ref().unwrap().parts().len(), 3);
            assert_eq!(entity.bounds.unwrap().mode, BoundsMode::Outset);
        }

        #[test]
        fn unbounded_prototype_uses_default_inset() {
            let prototype = EnemyPrototype {
                radius: None,
                ..EnemyPrototype::descender()
            };
            let mut spawner = EnemySpawner::new(only(prototype), extents());
            let mut arena = Arena::new();
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            spawner.tick(0.0, &mut arena, &mut rng);
            let spawned = spawner.tick(2.0, &mut arena, &mut rng).unwrap();
            let entity = arena.get(spawned.entity).unwrap();
            assert_eq!(entity.pose.position.y, 41.5);
            assert!(entity.bounds.is_none());
        }
    }

    #[test]
    fn prototype_components_carry_reward_settings() {
        let prototype = EnemyPrototype {
            score: 250,
            drop_chance: 0.25,
            ..EnemyPrototype::descender()
        };
        let components = prototype.components();
        assert_eq!(components.score, 250);
        assert_eq!(components.drop_chance, 0.25);
        assert_eq!(components.health, 10.0);
    }
}
