//! # Skystrike Core
//!
//! Arcade shooter core simulation for Skystrike.
//!
//! This crate provides the deterministic gameplay core of a vertical
//! shooter: a hero ship steered from input axes, waves of enemies flying
//! scripted motion profiles, weapons with distinct firing patterns, and the
//! damage, shield, and reward rules that connect them. Rendering, audio,
//! and physics stay outside; the host feeds clock samples, input axes, and
//! collision events in through [`simulation::TickInput`] and reads back a
//! [`simulation::TickReport`] of everything that happened.
//!
//! ## Architecture
//!
//! - **Arena**: entity storage with deterministic ID-ordered iteration
//! - **Bounds**: screen-edge flags and keep-on-screen clamping
//! - **Motion**: per-entity flight profiles
//! - **Weapons**: firing patterns and per-slot cooldowns
//! - **Damage**: collision resolution, shields, and reward drops
//! - **Spawner**: timed enemy placement
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use skystrike_core::{RewardTable, Simulation, SimulationConfig, TickInput, WeaponCatalog};
//!
//! let mut sim = Simulation::new(
//!     SimulationConfig::default(),
//!     Arc::new(WeaponCatalog::standard()),
//!     RewardTable::standard(),
//! )
//! .unwrap();
//!
//! let report = sim.step(&TickInput::idle(0.0, 1.0 / 60.0).firing());
//! assert_eq!(report.tick, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod bounds;
pub mod catalog;
pub mod config;
pub mod damage;
pub mod entity;
pub mod event;
pub mod hero;
pub mod motion;
pub mod simulation;
pub mod spawner;
pub mod weapon;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use catalog::{RewardTable, WeaponCatalog, WeaponType};
pub use config::{SetupError, SimulationConfig};
pub use entity::{Entity, EntityId, EntityTag};
pub use event::{Diagnostic, Event};
pub use simulation::{Simulation, TickInput, TickReport};
