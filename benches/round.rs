//! Round benchmarks
//!
//! Measures the autonomous decision pass and a full simulation step at
//! growing fighter counts.
//!
//! Run with: cargo bench --bench round

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};
use robot_arena::config::{AiConfig, FighterConfig, FuelConfig, RoundConfig};
use robot_arena::game::constants::tick::PHYSICS_DT;
use robot_arena::game::round::Round;
use robot_arena::game::state::{Arena, Fighter, FighterKind};
use robot_arena::game::systems::ai::{PilotRegistry, PilotTuning, UtilityPilot};
use robot_arena::game::systems::fuel;
use robot_arena::util::vec2::Vec2;
use uuid::Uuid;

const FIGHTER_COUNTS: [usize; 4] = [9, 25, 100, 400];

/// Arena side length that holds `count` fighters at the default density
fn arena_size_for(count: usize) -> f32 {
    (count as f32 * 100.0).sqrt()
}

/// Arena with randomly placed, randomly sized fighters and a full set of tanks
fn populated(count: usize) -> (Arena, PilotRegistry) {
    let size = arena_size_for(count);
    let half = size / 2.0;
    let mut rng = StdRng::seed_from_u64(count as u64);
    let tuning = PilotTuning::new(&AiConfig::default(), size);
    let fighter_config = FighterConfig::default();

    let mut arena = Arena::new();
    let mut pilots = PilotRegistry::new();
    for i in 0..count {
        let position = Vec2::new(
            rng.gen_range(-half * 0.8..half * 0.8),
            rng.gen_range(-half * 0.8..half * 0.8),
        );
        let mut fighter = Fighter::new(
            Uuid::new_v4(),
            format!("Robot #{}", i + 1),
            FighterKind::Autonomous,
            position,
            rng.gen_range(0.0..std::f32::consts::TAU),
            &fighter_config,
        );
        fighter.body.mass = rng.gen_range(1.0..4.0);
        fighter.active = true;
        pilots.register(UtilityPilot::new(
            fighter.id,
            tuning,
            SmallRng::seed_from_u64(rng.gen()),
        ));
        arena.add_fighter(fighter);
    }

    let fuel_config = FuelConfig {
        max_count: count.max(12),
        ..Default::default()
    };
    fuel::top_up(&mut arena, &fuel_config, half, &mut rng);
    pilots.broadcast_fighters(&arena.fighter_snapshot());
    pilots.broadcast_resources(&arena.resource_snapshot());
    (arena, pilots)
}

/// Benchmark one decision pass over every pilot
fn bench_decisions(c: &mut Criterion) {
    let mut group = c.benchmark_group("decisions");
    group.sample_size(50);

    for count in FIGHTER_COUNTS {
        let (arena, mut pilots) = populated(count);
        let mut now = 0.0;

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("decide_all", count), &count, |b, _| {
            b.iter(|| {
                // Step past the decision interval so every pilot re-scores
                now += 1.0;
                black_box(pilots.decide_all(&arena, now));
            });
        });
    }

    group.finish();
}

/// Benchmark a full simulation step (tick + physics tick) of a running round
fn bench_full_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_step");
    group.sample_size(30);

    for count in FIGHTER_COUNTS {
        let mut config = RoundConfig {
            seed: Some(7),
            ..Default::default()
        };
        config.arena.size = arena_size_for(count);
        config.timing.round_time = f32::MAX;
        let mut round = Round::new(config);
        round.tick(round.start_time());

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("tick", count), &count, |b, _| {
            b.iter(|| {
                black_box(round.tick(1.0 / 60.0));
                black_box(round.physics_tick(PHYSICS_DT));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decisions, bench_full_step);
criterion_main!(benches);
