use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skystrike_core::bounds::{BoundsFlags, ScreenExtents};
use skystrike_core::entity::Pose;
use skystrike_core::motion::{
    MotionContext, MotionProfile, RepeatingWaypointEase, SweepTuning, TwoPointWaypointSine,
};
use skystrike_core::{RewardTable, Simulation, SimulationConfig, TickInput, WeaponCatalog};

fn ctx(now: f32) -> MotionContext {
    MotionContext {
        now,
        dt: 1.0 / 60.0,
        pose: Pose::at(Vec2::new(0.0, 20.0)),
        bounds: BoundsFlags::ON_SCREEN,
        target: None,
    }
}

fn bench_sweep_advance(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let (sweep, _) =
        TwoPointWaypointSine::spawn(ScreenExtents::default(), 3.0, 0.0, SweepTuning::default(), &mut rng);
    let mut profile = MotionProfile::TwoPointWaypointSine(sweep);

    c.bench_function("sweep_advance", |b| {
        b.iter(|| black_box(profile.advance(black_box(&ctx(5.0)), &mut rng)))
    });
}

fn bench_hop_advance(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let hop = RepeatingWaypointEase::spawn(
        Vec2::new(0.0, 43.5),
        ScreenExtents::default(),
        3.5,
        0.0,
        RepeatingWaypointEase::DEFAULT_DURATION,
        &mut rng,
    );
    let mut profile = MotionProfile::RepeatingWaypointEase(hop);
    let mut now = 0.0;

    // Steps through cycle boundaries so waypoint picks are included.
    c.bench_function("hop_advance", |b| {
        b.iter(|| {
            now += 0.1;
            black_box(profile.advance(&ctx(now), &mut rng))
        })
    });
}

fn bench_busy_tick(c: &mut Criterion) {
    let mut config = SimulationConfig::default();
    config.spawner.per_second = 20.0;
    let mut sim = Simulation::new(
        config,
        Arc::new(WeaponCatalog::standard()),
        RewardTable::standard(),
    )
    .expect("stock setup");

    // Warm up so the arena holds a realistic crowd.
    let mut now = 0.0;
    for _ in 0..300 {
        sim.step(&TickInput::idle(now, 1.0 / 60.0).firing());
        now += 1.0 / 60.0;
    }

    c.bench_function("busy_tick", |b| {
        b.iter(|| {
            now += 1.0 / 60.0;
            black_box(sim.step(&TickInput::idle(now, 1.0 / 60.0).firing()))
        })
    });
}

criterion_group!(benches, bench_sweep_advance, bench_hop_advance, bench_busy_tick);
criterion_main!(benches);
