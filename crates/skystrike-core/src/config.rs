//! Session configuration.
//!
//! [`SimulationConfig`] gathers every tunable the simulation reads. All
//! structs derive `Deserialize` with `#[serde(default)]`, so an external
//! loader can supply only the fields it wants to override. The core never
//! reads files itself.
//!
//! ```
//! use skystrike_core::config::SimulationConfig;
//!
//! let config: SimulationConfig = serde_json::from_str(r#"{ "seed": 9 }"#).unwrap();
//! assert_eq!(config.seed, 9);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounds::ScreenExtents;
use crate::catalog::CatalogError;
use crate::hero::HeroTuning;
use crate::spawner::SpawnerConfig;
use crate::weapon::PatternTuning;

/// Configuration problems detected before a session starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive is not.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A probability outside `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// The hero would start above its shield cap.
    #[error("shield start {start} exceeds maximum {max}")]
    ShieldAboveMax {
        /// Configured start level.
        start: u32,
        /// Configured cap.
        max: u32,
    },
    /// The hero has no weapon mounts.
    #[error("hero needs at least one weapon slot")]
    NoWeaponSlots,
    /// The spawner has nothing to spawn.
    #[error("spawner has no enemy prototypes")]
    NoEnemyPrototypes,
    /// A composite prototype reuses the base shield id.
    #[error("sub-shield id 0 is reserved for the base shield")]
    ReservedShieldId,
}

/// Failures while setting up a session.
#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    /// Invalid session configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Invalid weapon catalog or reward table.
    #[error("invalid weapon catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Everything a session reads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every random choice in the session.
    pub seed: u64,
    /// Visible play field.
    pub extents: ScreenExtents,
    /// Player ship.
    pub hero: HeroTuning,
    /// Enemy spawning.
    pub spawner: SpawnerConfig,
    /// Firing pattern constants.
    pub patterns: PatternTuning,
    /// Bounds radius of projectiles.
    pub projectile_radius: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            extents: ScreenExtents::default(),
            hero: HeroTuning::default(),
            spawner: SpawnerConfig::default(),
            patterns: PatternTuning::default(),
            projectile_radius: 0.5,
        }
    }
}

impl SimulationConfig {
    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("extents.half_width", self.extents.half_width)?;
        positive("extents.half_height", self.extents.half_height)?;

        positive("hero.speed", self.hero.speed)?;
        if self.hero.shield_start > self.hero.shield_max {
            return Err(ConfigError::ShieldAboveMax {
                start: self.hero.shield_start,
                max: self.hero.shield_max,
            });
        }
        if self.hero.weapon_slots == 0 {
            return Err(ConfigError::NoWeaponSlots);
        }

        positive("spawner.per_second", self.spawner.per_second)?;
        if self.spawner.prototypes.is_empty() {
            return Err(ConfigError::NoEnemyPrototypes);
        }
        for prototype in &self.spawner.prototypes {
            positive("prototype.health", prototype.health)?;
            unit("prototype.drop_chance", prototype.drop_chance)?;
            for (field, value) in prototype.motion.durations() {
                positive(field, value)?;
            }
            if prototype.sub_shields.iter().any(|s| s.id == 0) {
                return Err(ConfigError::ReservedShieldId);
            }
        }

        positive("projectile_radius", self.projectile_radius)?;
        positive("patterns.wave.period", self.patterns.wave.period)?;
        unit("patterns.homing_fraction", self.patterns.homing_fraction)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}
