//! Determinism verification tests.
//!
//! A session seeded identically and fed identical inputs must produce
//! identical tick reports and identical arena state. Replays and
//! lockstep networking rely on this.

use glam::Vec2;

use crate::config::SimulationConfig;
use crate::damage::CollisionEvent;
use crate::entity::EntityId;
use crate::event::Event;
use crate::hero::MovementInput;
use crate::simulation::{Simulation, TickInput, TickReport};

use super::helpers::session;

const TICKS: u16 = 600;
const DT: f32 = 1.0 / 60.0;

fn busy_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig {
        seed,
        ..SimulationConfig::default()
    };
    config.spawner.per_second = 4.0;
    config
}

/// Drives a session with scripted input, reporting a hit between the oldest
/// live projectile and the oldest live enemy every tenth tick.
fn run(sim: &mut Simulation) -> Vec<TickReport> {
    let mut reports = Vec::with_capacity(usize::from(TICKS));
    for i in 0..TICKS {
        let now = f32::from(i) * DT;
        let phase = f32::from(i % 120) / 120.0;
        let mut input = TickInput::idle(now, DT)
            .moving(MovementInput::new((phase * std::f32::consts::TAU).sin(), 0.0))
            .firing();

        if i % 10 == 0 {
            if let Some(hit) = scripted_hit(sim) {
                input.collisions.push(hit);
            }
        }
        reports.push(sim.step(&input));
    }
    reports
}

fn scripted_hit(sim: &Simulation) -> Option<CollisionEvent> {
    let arena = sim.arena();
    let shot = arena
        .entities_sorted()
        .find(|e| e.is_alive() && e.is_projectile())
        .map(crate::entity::Entity::id)?;
    let enemy = arena
        .entities_sorted()
        .find(|e| e.is_alive() && e.is_enemy())
        .map(crate::entity::Entity::id)?;
    Some(CollisionEvent::between(shot, enemy))
}

fn spawn_positions(reports: &[TickReport], sim: &Simulation) -> Vec<(EntityId, Vec2)> {
    reports
        .iter()
        .flat_map(|r| r.events.iter())
        .filter_map(|e| match e {
            Event::RewardSpawned {
                entity, position, ..
            } => Some((*entity, *position)),
            _ => None,
        })
        .chain(
            sim.arena()
                .entities_sorted()
                .filter(|e| e.is_enemy())
                .map(|e| (e.id(), e.pose.position)),
        )
        .collect()
}

#[test]
fn same_seed_same_reports() {
    let mut a = session(busy_config(42));
    let mut b = session(busy_config(42));

    let reports_a = run(&mut a);
    let reports_b = run(&mut b);

    assert_eq!(reports_a, reports_b);
    assert_eq!(a.tick(), u64::from(TICKS));
    assert_eq!(spawn_positions(&reports_a, &a), spawn_positions(&reports_b, &b));
}

#[test]
fn same_seed_same_serialized_state() {
    let mut a = session(busy_config(7));
    let mut b = session(busy_config(7));
    run(&mut a);
    run(&mut b);

    let json_a = serde_json::to_string(a.arena()).unwrap();
    let json_b = serde_json::to_string(b.arena()).unwrap();
    assert_eq!(json_a, json_b);
}

#[test]
fn run_exercises_the_whole_loop() {
    let mut sim = session(busy_config(3));
    let reports = run(&mut sim);
    let events: Vec<&Event> = reports.iter().flat_map(|r| r.events.iter()).collect();

    assert!(events.iter().any(|e| matches!(e, Event::EnemySpawned { .. })));
    assert!(events.iter().any(|e| matches!(e, Event::ProjectileSpawned { .. })));
    assert!(events.iter().any(|e| matches!(e, Event::DamageDealt { .. })));
}

#[test]
fn different_seeds_diverge() {
    let mut a = session(busy_config(1));
    let mut b = session(busy_config(2));

    let reports_a = run(&mut a);
    let reports_b = run(&mut b);

    assert_ne!(spawn_positions(&reports_a, &a), spawn_positions(&reports_b, &b));
}
