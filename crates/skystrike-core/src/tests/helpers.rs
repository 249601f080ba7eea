//! Test helpers for building sessions and placing entities.

use std::sync::Arc;

use glam::Vec2;

use crate::arena::Arena;
use crate::bounds::{BoundsBinding, BoundsMode};
use crate::catalog::{RewardTable, WeaponCatalog, WeaponType};
use crate::config::SimulationConfig;
use crate::entity::{
    EnemyComponents, Entity, EntityId, EntityInner, EntityTag, Pose, PowerUpComponents,
};
use crate::event::Event;
use crate::simulation::{Simulation, TickReport};
use crate::spawner::SpawnerConfig;

/// Installs a subscriber that routes `tracing` output through the test
/// harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Sessions
// =============================================================================

/// A config with the spawner switched off, so tests place every enemy.
pub fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        spawner: SpawnerConfig {
            enabled: false,
            ..SpawnerConfig::default()
        },
        ..SimulationConfig::default()
    }
}

/// A session on the stock catalog and reward table.
pub fn session(config: SimulationConfig) -> Simulation {
    session_with_catalog(config, WeaponCatalog::standard())
}

/// A session on a custom catalog with the stock reward table.
pub fn session_with_catalog(config: SimulationConfig, catalog: WeaponCatalog) -> Simulation {
    init_tracing();
    Simulation::new(config, Arc::new(catalog), RewardTable::standard())
        .expect("test session should build")
}

/// A quiet session whose hero starts with `weapon_type`.
pub fn armed_session(weapon_type: WeaponType) -> Simulation {
    let mut config = quiet_config();
    config.hero.starting_weapon = weapon_type;
    session(config)
}

// =============================================================================
// Entities
// =============================================================================

/// Spawns a plain enemy with no bounds or motion.
pub fn spawn_enemy(arena: &mut Arena, position: Vec2, health: f32) -> EntityId {
    arena.spawn(
        EntityTag::Enemy,
        EntityInner::Enemy(EnemyComponents::with_health(health)),
        Pose::at(position),
    )
}

/// Spawns an enemy tracked with outset bounds, like the spawner does.
pub fn spawn_bounded_enemy(arena: &mut Arena, position: Vec2, health: f32) -> EntityId {
    let components = EnemyComponents::with_health(health);
    arena.spawn_with(|id| {
        Entity::new(id, EntityInner::Enemy(components), Pose::at(position))
            .with_bounds(BoundsBinding::free(2.5, BoundsMode::Outset))
    })
}

/// Spawns a power-up carrying `reward`.
pub fn spawn_power_up(arena: &mut Arena, position: Vec2, reward: WeaponType) -> EntityId {
    arena.spawn(
        EntityTag::PowerUp,
        EntityInner::PowerUp(PowerUpComponents { reward }),
        Pose::at(position),
    )
}

// =============================================================================
// Report queries
// =============================================================================

/// Projectiles announced in `report`, in spawn order.
pub fn projectiles_spawned(report: &TickReport) -> Vec<EntityId> {
    report
        .events
        .iter()
        .filter_map(|e| match e {
            Event::ProjectileSpawned { entity, .. } => Some(*entity),
            _ => None,
        })
        .collect()
}

/// Number of events in `report` matching `pred`.
pub fn count_events(report: &TickReport, pred: impl Fn(&Event) -> bool) -> usize {
    report.events.iter().filter(|e| pred(e)).count()
}
