//! Cooldown-gated weapon slots and firing patterns.
//!
//! A [`WeaponController`] owns an ordered list of [`WeaponSlot`]s. Each fire
//! trigger is dispatched to a slot, which checks its cooldown, looks up its
//! [`WeaponDefinition`](crate::catalog::WeaponDefinition) in the shared
//! catalog, and turns the definition's [`FiringPattern`] into zero or more
//! [`ProjectileSpawn`] requests. The controller never touches the arena: the
//! caller spawns the requests and supplies the live targets through a
//! [`TargetRegistry`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use glam::Vec2;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use skystrike_core::catalog::{WeaponCatalog, WeaponType};
//! use skystrike_core::weapon::{FireContext, LiveTargets, PatternTuning, WeaponController};
//!
//! let mut weapons = WeaponController::new(Arc::new(WeaponCatalog::standard()), PatternTuning::default(), 5);
//! weapons.set_weapon(0, WeaponType::Spread);
//!
//! let targets = LiveTargets::default();
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let mut ctx = FireContext { now: 0.0, muzzle: Vec2::ZERO, targets: &targets, rng: &mut rng };
//!
//! assert_eq!(weapons.fire_all(&mut ctx).len(), 3);
//! // Still cooling down.
//! assert!(weapons.fire_all(&mut ctx).is_empty());
//! ```

use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::catalog::{FiringPattern, WeaponCatalog, WeaponDefinition, WeaponType};
use crate::entity::{EntityId, Pose};
use crate::motion::{
    look_rotation, HomingPursuit, LateralSineWeave, LinearDescent, MotionProfile, WeaveTuning,
};

// =============================================================================
// Live targets
// =============================================================================

/// A targetable enemy as seen at the start of a fire phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveTarget {
    /// Entity id of the enemy.
    pub id: EntityId,
    /// Position at snapshot time.
    pub position: Vec2,
}

/// Read access to the enemies that weapons may aim at.
///
/// Implementors only need [`targets`](Self::targets); the selection rules are
/// shared.
pub trait TargetRegistry {
    /// Live targets in enumeration order.
    fn targets(&self) -> &[LiveTarget];

    /// Picks a live target uniformly at random.
    fn random_target(&self, rng: &mut dyn RngCore) -> Option<LiveTarget> {
        let targets = self.targets();
        if targets.is_empty() {
            return None;
        }
        Some(targets[rng.gen_range(0..targets.len())])
    }

    /// The target geometrically nearest to `point`; ties go to the earliest in
    /// enumeration order.
    fn nearest_to(&self, point: Vec2) -> Option<LiveTarget> {
        let mut nearest: Option<(LiveTarget, f32)> = None;
        for target in self.targets() {
            let distance = target.position.distance_squared(point);
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((*target, distance));
            }
        }
        nearest.map(|(target, _)| target)
    }
}

/// A snapshot of live targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveTargets(Vec<LiveTarget>);

impl LiveTargets {
    /// Wraps targets already in enumeration order.
    #[must_use]
    pub fn new(targets: Vec<LiveTarget>) -> Self {
        Self(targets)
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there is nothing to aim at.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of target `id`, if it is in the snapshot.
    #[must_use]
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.0.iter().find(|t| t.id == id).map(|t| t.position)
    }
}

impl FromIterator<LiveTarget> for LiveTargets {
    fn from_iter<I: IntoIterator<Item = LiveTarget>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TargetRegistry for LiveTargets {
    fn targets(&self) -> &[LiveTarget] {
        &self.0
    }
}

// =============================================================================
// Firing
// =============================================================================

/// Per-pattern tuning constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTuning {
    /// Angle of the side shots of a spread, in degrees.
    pub spread_angle_deg: f32,
    /// Sine swing of wave shots.
    pub wave: WeaveTuning,
    /// Fraction of the remaining distance a homing shot covers per tick.
    pub homing_fraction: f32,
    /// Roll added after aiming a nearest-target shot, in degrees.
    pub nearest_roll_deg: f32,
}

impl Default for PatternTuning {
    fn default() -> Self {
        Self {
            spread_angle_deg: 10.0,
            wave: WeaveTuning::default(),
            homing_fraction: HomingPursuit::DEFAULT_FRACTION,
            nearest_roll_deg: 90.0,
        }
    }
}

/// Inputs to one fire trigger.
pub struct FireContext<'a> {
    /// Clock sample for this tick.
    pub now: f32,
    /// World position projectiles spawn from.
    pub muzzle: Vec2,
    /// Targets for homing and nearest-target patterns.
    pub targets: &'a dyn TargetRegistry,
    /// Source of random target choices.
    pub rng: &'a mut dyn RngCore,
}

/// A request to spawn one projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpawn {
    /// Weapon that fired the shot.
    pub weapon_type: WeaponType,
    /// Slot that fired the shot.
    pub slot: usize,
    /// Initial pose.
    pub pose: Pose,
    /// Linear velocity; zero for wave and homing shots.
    pub velocity: Vec2,
    /// Motion driving the projectile.
    pub motion: MotionProfile,
    /// Target bound by homing shots.
    pub homing_target: Option<EntityId>,
}

/// One weapon mount.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeaponSlot {
    weapon_type: WeaponType,
    ready_at: Option<f32>,
}

impl WeaponSlot {
    /// Weapon currently mounted.
    #[must_use]
    pub const fn weapon_type(&self) -> WeaponType {
        self.weapon_type
    }

    /// Earliest time the slot may fire again; `None` when ready.
    #[must_use]
    pub const fn ready_at(&self) -> Option<f32> {
        self.ready_at
    }

    /// Returns `true` if the slot may fire at `now`.
    #[must_use]
    pub fn is_ready(&self, now: f32) -> bool {
        self.ready_at.map_or(true, |t| now >= t)
    }

    /// Returns `true` when nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weapon_type == WeaponType::None
    }
}

/// The hero's weapon mounts.
#[derive(Debug, Clone)]
pub struct WeaponController {
    catalog: Arc<WeaponCatalog>,
    tuning: PatternTuning,
    slots: Vec<WeaponSlot>,
}

impl WeaponController {
    /// Creates a controller with `slot_count` empty slots.
    #[must_use]
    pub fn new(catalog: Arc<WeaponCatalog>, tuning: PatternTuning, slot_count: usize) -> Self {
        Self {
            catalog,
            tuning,
            slots: vec![WeaponSlot::default(); slot_count],
        }
    }

    /// Slots in firing order.
    #[must_use]
    pub fn slots(&self) -> &[WeaponSlot] {
        &self.slots
    }

    /// Mounts `weapon_type` in `slot` and makes it fireable immediately.
    ///
    /// Out-of-range slots are ignored.
    pub fn set_weapon(&mut self, slot: usize, weapon_type: WeaponType) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.weapon_type = weapon_type;
            s.ready_at = None;
        }
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        for slot in 0..self.slots.len() {
            self.set_weapon(slot, WeaponType::None);
        }
    }

    /// Takes a weapon pickup.
    ///
    /// The same weapon as slot 0 fills the first empty slot (nothing happens
    /// when every slot is full). A different weapon replaces the whole loadout
    /// with a single copy in slot 0. Returns the slot the weapon went into.
    pub fn absorb_weapon(&mut self, weapon_type: WeaponType) -> Option<usize> {
        let primary = self.slots.first().map(WeaponSlot::weapon_type);
        if primary == Some(weapon_type) {
            let empty = self.slots.iter().position(WeaponSlot::is_empty)?;
            self.set_weapon(empty, weapon_type);
            Some(empty)
        } else {
            self.clear();
            self.set_weapon(0, weapon_type);
            (!self.slots.is_empty()).then_some(0)
        }
    }

    /// Fires every slot in ascending slot order.
    pub fn fire_all(&mut self, ctx: &mut FireContext<'_>) -> Vec<ProjectileSpawn> {
        let mut spawns = Vec::new();
        for slot in 0..self.slots.len() {
            spawns.extend(self.on_fire_trigger(slot, ctx));
        }
        spawns
    }

    /// Fires one slot.
    ///
    /// Returns no spawns while the slot is cooling down, when it holds a
    /// weapon without a firing pattern, or when a targeted pattern finds no
    /// target. Any spawn restarts the slot's cooldown.
    pub fn on_fire_trigger(&mut self, slot: usize, ctx: &mut FireContext<'_>) -> Vec<ProjectileSpawn> {
        let Some(state) = self.slots.get(slot) else {
            return Vec::new();
        };
        if !state.is_ready(ctx.now) {
            return Vec::new();
        }

        let catalog = Arc::clone(&self.catalog);
        let def = catalog.lookup(state.weapon_type);
        let Some(pattern) = def.pattern else {
            return Vec::new();
        };

        let spawns = self.pattern_spawns(pattern, def, slot, ctx);
        if !spawns.is_empty() {
            self.slots[slot].ready_at = Some(ctx.now + def.delay_between_shots);
            tracing::trace!(
                slot,
                weapon = %def.weapon_type,
                count = spawns.len(),
                "weapon fired"
            );
        }
        spawns
    }

    fn pattern_spawns(
        &self,
        pattern: FiringPattern,
        def: &WeaponDefinition,
        slot: usize,
        ctx: &mut FireContext<'_>,
    ) -> Vec<ProjectileSpawn> {
        let shot = Shot {
            weapon_type: def.weapon_type,
            slot,
            muzzle: ctx.muzzle,
        };
        let forward = Vec2::new(0.0, def.velocity);

        match pattern {
            FiringPattern::Single => vec![shot.straight(Quat::IDENTITY, forward)],
            FiringPattern::Spread => {
                let angle = self.tuning.spread_angle_deg.to_radians();
                vec![
                    shot.straight(Quat::IDENTITY, forward),
                    shot.straight(Quat::from_axis_angle(Vec3::NEG_Z, angle), forward),
                    shot.straight(Quat::from_axis_angle(Vec3::NEG_Z, -angle), forward),
                ]
            }
            FiringPattern::Wave => {
                let weave =
                    LateralSineWeave::upward(ctx.muzzle.x, ctx.now, def.velocity, self.tuning.wave);
                vec![shot.weaving(weave), shot.weaving(weave.mirrored())]
            }
            FiringPattern::Homing => {
                let Some(target) = ctx.targets.random_target(&mut *ctx.rng) else {
                    tracing::debug!(slot, "homing shot skipped: no live target");
                    return Vec::new();
                };
                vec![shot.homing(target.id, self.tuning.homing_fraction)]
            }
            FiringPattern::NearestTarget => {
                let Some(target) = ctx.targets.nearest_to(ctx.muzzle) else {
                    tracing::debug!(slot, "aimed shot skipped: no live target");
                    return Vec::new();
                };
                let direction = (target.position - ctx.muzzle)
                    .try_normalize()
                    .unwrap_or(Vec2::Y);
                let orientation = look_rotation(direction.extend(0.0), Vec3::Y)
                    * Quat::from_rotation_z(self.tuning.nearest_roll_deg.to_radians());
                let velocity = (orientation * Vec3::Z).truncate() * def.velocity;
                vec![shot.linear(orientation, velocity)]
            }
        }
    }
}

/// Shared fields of the spawns produced by one trigger.
struct Shot {
    weapon_type: WeaponType,
    slot: usize,
    muzzle: Vec2,
}

impl Shot {
    fn spawn(&self, orientation: Quat, velocity: Vec2, motion: MotionProfile) -> ProjectileSpawn {
        ProjectileSpawn {
            weapon_type: self.weapon_type,
            slot: self.slot,
            pose: Pose {
                position: self.muzzle,
                orientation,
            },
            velocity,
            homing_target: motion.homing_target(),
            motion,
        }
    }

    fn straight(&self, rotation: Quat, forward: Vec2) -> ProjectileSpawn {
        let velocity = (rotation * forward.extend(0.0)).truncate();
        self.linear(rotation, velocity)
    }

    fn linear(&self, orientation: Quat, velocity: Vec2) -> ProjectileSpawn {
        let motion = MotionProfile::LinearDescent(LinearDescent::toward(velocity));
        self.spawn(orientation, velocity, motion)
    }

    fn weaving(&self, weave: LateralSineWeave) -> ProjectileSpawn {
        self.spawn(
            Quat::IDENTITY,
            Vec2::ZERO,
            MotionProfile::LateralSineWeave(weave),
        )
    }

    fn homing(&self, target: EntityId, approach_fraction: f32) -> ProjectileSpawn {
        let motion = MotionProfile::HomingPursuit(HomingPursuit {
            target,
            approach_fraction,
        });
        self.spawn(Quat::IDENTITY, Vec2::ZERO, motion)
    }
}
