//! Weapon definitions and the reward table.
//!
//! The [`WeaponCatalog`] is built once per session from externally loaded
//! definitions and is read-only afterwards; share it with `Arc`. Lookups never
//! fail: unmapped types resolve to [`WeaponDefinition::NONE`], which has zero
//! damage, zero velocity, and no firing pattern.
//!
//! Construction is the one place where configuration integrity is enforced.
//! A definition that could fire but names no pattern is rejected with
//! [`CatalogError::MissingPattern`] instead of being discovered mid-tick.
//!
//! # Example
//!
//! ```
//! use skystrike_core::catalog::{FiringPattern, WeaponCatalog, WeaponDefinition, WeaponType};
//!
//! let catalog = WeaponCatalog::new([WeaponDefinition::new(
//!     WeaponType::Blaster,
//!     FiringPattern::Single,
//!     1.0,
//!     40.0,
//!     0.3,
//! )])
//! .unwrap();
//!
//! assert_eq!(catalog.lookup(WeaponType::Blaster).velocity, 40.0);
//! assert_eq!(catalog.lookup(WeaponType::Missile).damage_on_hit, 0.0);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weapon type identifiers.
///
/// `None` is the empty-slot / unmapped sentinel. `Shield` is not a weapon: as a
/// reward it raises the hero's shield level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    /// No weapon
    #[default]
    None,
    /// Straight single shots
    Blaster,
    /// Three shots in a fan
    Spread,
    /// Two shots weaving around the firing line
    Phaser,
    /// Homing shots bound to a random target
    Missile,
    /// Shots aimed at the nearest target
    Swivel,
    /// Shield-level reward (not fireable)
    Shield,
}

impl WeaponType {
    /// Returns `true` for types that occupy a weapon slot and fire.
    #[must_use]
    pub const fn is_weapon(self) -> bool {
        !matches!(self, Self::None | Self::Shield)
    }
}

impl fmt::Display for WeaponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Blaster => "blaster",
            Self::Spread => "spread",
            Self::Phaser => "phaser",
            Self::Missile => "missile",
            Self::Swivel => "swivel",
            Self::Shield => "shield",
        };
        f.write_str(name)
    }
}

/// The spawn pattern a weapon produces when fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiringPattern {
    /// One projectile straight ahead.
    Single,
    /// Three projectiles: straight and rotated to either side.
    Spread,
    /// Two weaving projectiles with mirrored amplitude.
    Wave,
    /// One projectile homing on a random live target.
    Homing,
    /// One projectile aimed at the nearest live target.
    NearestTarget,
}

/// Gameplay parameters of one weapon type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    /// Type this definition describes.
    pub weapon_type: WeaponType,
    /// Damage dealt by one projectile hit.
    pub damage_on_hit: f32,
    /// Projectile speed.
    pub velocity: f32,
    /// Seconds between shots.
    pub delay_between_shots: f32,
    /// Spawn pattern; `None` only for non-weapon types.
    #[serde(default)]
    pub pattern: Option<FiringPattern>,
}

static NONE_DEFINITION: WeaponDefinition = WeaponDefinition::NONE;

impl WeaponDefinition {
    /// The sentinel returned for unmapped types.
    pub const NONE: Self = Self {
        weapon_type: WeaponType::None,
        damage_on_hit: 0.0,
        velocity: 0.0,
        delay_between_shots: 0.0,
        pattern: None,
    };

    /// Creates a fireable definition.
    #[must_use]
    pub const fn new(
        weapon_type: WeaponType,
        pattern: FiringPattern,
        damage_on_hit: f32,
        velocity: f32,
        delay_between_shots: f32,
    ) -> Self {
        Self {
            weapon_type,
            damage_on_hit,
            velocity,
            delay_between_shots,
            pattern: Some(pattern),
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.weapon_type == WeaponType::None {
            return Err(CatalogError::ReservedType);
        }
        if self.weapon_type.is_weapon() && self.pattern.is_none() {
            return Err(CatalogError::MissingPattern(self.weapon_type));
        }
        for (field, value) in [
            ("damage_on_hit", self.damage_on_hit),
            ("velocity", self.velocity),
            ("delay_between_shots", self.delay_between_shots),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CatalogError::InvalidValue {
                    weapon: self.weapon_type,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Startup configuration errors for the catalog and reward table.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A definition was registered for [`WeaponType::None`].
    #[error("weapon type `none` is reserved for the lookup sentinel")]
    ReservedType,
    /// Two definitions share a type.
    #[error("weapon type `{0}` is defined more than once")]
    DuplicateDefinition(WeaponType),
    /// A fireable type has no firing pattern.
    #[error("weapon type `{0}` has no firing pattern")]
    MissingPattern(WeaponType),
    /// A numeric field is negative or not finite.
    #[error("weapon type `{weapon}` has invalid {field}: {value}")]
    InvalidValue {
        /// Offending type
        weapon: WeaponType,
        /// Offending field
        field: &'static str,
        /// Offending value
        value: f32,
    },
    /// A type the session relies on has no definition.
    #[error("weapon type `{0}` is referenced but not defined")]
    Unmapped(WeaponType),
    /// The reward table lists nothing.
    #[error("reward table must list at least one reward")]
    EmptyRewardTable,
}

/// Read-only table from weapon type to definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponCatalog {
    definitions: BTreeMap<WeaponType, WeaponDefinition>,
}

impl WeaponCatalog {
    /// Builds and validates a catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a definition uses the reserved `None`
    /// type, is duplicated, lacks a pattern while being fireable, or carries a
    /// negative or non-finite number.
    pub fn new(
        definitions: impl IntoIterator<Item = WeaponDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut table = BTreeMap::new();
        for definition in definitions {
            definition.validate()?;
            if table.insert(definition.weapon_type, definition).is_some() {
                return Err(CatalogError::DuplicateDefinition(definition.weapon_type));
            }
        }
        Ok(Self { definitions: table })
    }

    /// The stock weapon set.
    #[must_use]
    pub fn standard() -> Self {
        let definitions = [
            WeaponDefinition::new(WeaponType::Blaster, FiringPattern::Single, 1.0, 50.0, 0.2),
            WeaponDefinition::new(WeaponType::Spread, FiringPattern::Spread, 1.0, 50.0, 0.4),
            WeaponDefinition::new(WeaponType::Phaser, FiringPattern::Wave, 1.0, 20.0, 0.3),
            WeaponDefinition::new(WeaponType::Missile, FiringPattern::Homing, 10.0, 0.0, 1.0),
            WeaponDefinition::new(WeaponType::Swivel, FiringPattern::NearestTarget, 1.0, 40.0, 0.3),
            WeaponDefinition {
                weapon_type: WeaponType::Shield,
                damage_on_hit: 0.0,
                velocity: 0.0,
                delay_between_shots: 0.0,
                pattern: None,
            },
        ];
        Self {
            definitions: definitions.into_iter().map(|d| (d.weapon_type, d)).collect(),
        }
    }

    /// Returns the definition for `weapon_type`, or [`WeaponDefinition::NONE`].
    #[must_use]
    pub fn lookup(&self, weapon_type: WeaponType) -> &WeaponDefinition {
        self.definitions
            .get(&weapon_type)
            .unwrap_or(&NONE_DEFINITION)
    }

    /// Returns `true` if `weapon_type` has a definition.
    #[must_use]
    pub fn contains(&self, weapon_type: WeaponType) -> bool {
        self.definitions.contains_key(&weapon_type)
    }

    /// Fails if a fireable `weapon_type` has no definition.
    ///
    /// `None` and `Shield` need no definition.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unmapped`] for an undefined weapon type.
    pub fn ensure_mapped(&self, weapon_type: WeaponType) -> Result<(), CatalogError> {
        if weapon_type.is_weapon() && !self.contains(weapon_type) {
            return Err(CatalogError::Unmapped(weapon_type));
        }
        Ok(())
    }

    /// Iterates definitions in type order.
    pub fn iter(&self) -> impl Iterator<Item = &WeaponDefinition> + '_ {
        self.definitions.values()
    }
}

/// Weighted list of rewards dropped by destroyed enemies.
///
/// Weighting is by repetition: a type listed twice is twice as likely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardTable {
    frequency: Vec<WeaponType>,
}

impl RewardTable {
    /// Builds a reward table whose weapon rewards are all defined in `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptyRewardTable`] for an empty list and
    /// [`CatalogError::Unmapped`] for a weapon reward missing from the catalog.
    pub fn new(frequency: Vec<WeaponType>, catalog: &WeaponCatalog) -> Result<Self, CatalogError> {
        if frequency.is_empty() {
            return Err(CatalogError::EmptyRewardTable);
        }
        if let Some(&reserved) = frequency.iter().find(|t| **t == WeaponType::None) {
            return Err(CatalogError::Unmapped(reserved));
        }
        for &reward in &frequency {
            catalog.ensure_mapped(reward)?;
        }
        Ok(Self { frequency })
    }

    /// The stock table: blaster twice, spread, shield.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            frequency: vec![
                WeaponType::Blaster,
                WeaponType::Blaster,
                WeaponType::Spread,
                WeaponType::Shield,
            ],
        }
    }

    /// The listed rewards.
    #[must_use]
    pub fn frequency(&self) -> &[WeaponType] {
        &self.frequency
    }

    /// Draws one reward uniformly from the list.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> WeaponType {
        let index = rng.gen_range(0..self.frequency.len());
        self.frequency[index]
    }
}
