//! The player ship: steering from input axes, loadout, and pickups.

use std::sync::Arc;

use glam::{EulerRot, Quat, Vec2};
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::bounds::{BoundsBinding, BoundsMode};
use crate::catalog::{WeaponCatalog, WeaponType};
use crate::entity::{Entity, EntityId, EntityInner, HeroComponents, Pose, ShieldLevel};
use crate::weapon::{PatternTuning, WeaponController};

/// Hero settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroTuning {
    /// Units per second at full deflection.
    pub speed: f32,
    /// Degrees of roll (about Y) at full horizontal deflection.
    pub roll_mult: f32,
    /// Degrees of pitch (about X) at full vertical deflection.
    pub pitch_mult: f32,
    /// Shield level at spawn.
    pub shield_start: u32,
    /// Shield level cap.
    pub shield_max: u32,
    /// Bounds radius; the hero is kept fully on screen.
    pub radius: f32,
    /// Number of weapon mounts.
    pub weapon_slots: usize,
    /// Weapon mounted in slot 0 at spawn.
    pub starting_weapon: WeaponType,
    /// Spawn position.
    pub start_position: Vec2,
    /// Muzzle position relative to the hero.
    pub muzzle_offset: Vec2,
}

impl Default for HeroTuning {
    fn default() -> Self {
        Self {
            speed: 30.0,
            roll_mult: -45.0,
            pitch_mult: 30.0,
            shield_start: 2,
            shield_max: 4,
            radius: 4.0,
            weapon_slots: 5,
            starting_weapon: WeaponType::Swivel,
            start_position: Vec2::new(0.0, -30.0),
            muzzle_offset: Vec2::new(0.0, 2.0),
        }
    }
}

/// Movement axes for one tick, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementInput {
    /// Right is positive.
    pub horizontal: f32,
    /// Up is positive.
    pub vertical: f32,
}

impl MovementInput {
    /// Creates an input, clamping both axes to `[-1, 1]`.
    #[must_use]
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal: horizontal.clamp(-1.0, 1.0),
            vertical: vertical.clamp(-1.0, 1.0),
        }
    }
}

/// Steers the hero and owns its weapons.
#[derive(Debug, Clone)]
pub struct HeroControl {
    tuning: HeroTuning,
    weapons: WeaponController,
}

impl HeroControl {
    /// Creates the controller with the starting weapon mounted.
    #[must_use]
    pub fn new(tuning: HeroTuning, catalog: Arc<WeaponCatalog>, patterns: PatternTuning) -> Self {
        let mut weapons = WeaponController::new(catalog, patterns, tuning.weapon_slots);
        weapons.set_weapon(0, tuning.starting_weapon);
        Self { tuning, weapons }
    }

    /// Settings in use.
    #[must_use]
    pub const fn tuning(&self) -> &HeroTuning {
        &self.tuning
    }

    /// The hero's weapon mounts.
    #[must_use]
    pub const fn weapons(&self) -> &WeaponController {
        &self.weapons
    }

    /// Mutable access to the weapon mounts.
    pub fn weapons_mut(&mut self) -> &mut WeaponController {
        &mut self.weapons
    }

    /// Spawns the hero entity.
    pub fn spawn(&self, arena: &mut Arena) -> EntityId {
        let components = HeroComponents::new(ShieldLevel::new(
            self.tuning.shield_start,
            self.tuning.shield_max,
        ));
        let pose = Pose::at(self.tuning.start_position);
        let bounds = BoundsBinding::kept(self.tuning.radius, BoundsMode::Inset);
        arena.spawn_with(|id| Entity::new(id, EntityInner::Hero(components), pose).with_bounds(bounds))
    }

    /// Next pose from the movement axes.
    ///
    /// Position moves by `axis × speed × dt`; the ship pitches with the
    /// vertical axis and rolls with the horizontal one.
    #[must_use]
    pub fn steer(&self, pose: Pose, input: MovementInput, dt: f32) -> Pose {
        let axes = Vec2::new(input.horizontal, input.vertical);
        let position = pose.position + axes * self.tuning.speed * dt;
        let orientation = Quat::from_euler(
            EulerRot::YXZ,
            (input.horizontal * self.tuning.roll_mult).to_radians(),
            (input.vertical * self.tuning.pitch_mult).to_radians(),
            0.0,
        );
        Pose {
            position,
            orientation,
        }
    }

    /// Where shots leave the hero.
    #[must_use]
    pub fn muzzle(&self, pose: &Pose) -> Vec2 {
        pose.position + self.tuning.muzzle_offset
    }

    /// Mounts a weapon pickup following the loadout rules of
    /// [`WeaponController::absorb_weapon`].
    pub fn absorb_weapon(&mut self, weapon_type: WeaponType) -> Option<usize> {
        let slot = self.weapons.absorb_weapon(weapon_type);
        tracing::debug!(%weapon_type, ?slot, "weapon pickup mounted");
        slot
    }
}
