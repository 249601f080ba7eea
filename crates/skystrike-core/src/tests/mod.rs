//! Crate-level tests that drive the whole tick loop.
//!
//! - `determinism.rs`: same seed and inputs give identical reports
//! - `integration.rs`: end-to-end gameplay rules through [`Simulation::step`]
//! - `helpers.rs`: session builders and arena setup shortcuts
//!
//! [`Simulation::step`]: crate::simulation::Simulation::step

mod determinism;
mod helpers;

pub use helpers::*;
