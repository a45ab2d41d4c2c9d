use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gridlife::{step, GridState, RuleSet, Simulation, SimulationConfig};

fn random_grid(size: u32) -> GridState {
    let mut grid = GridState::new(size, size);
    grid.randomize(0.3, &mut StdRng::seed_from_u64(42));
    grid
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for size in [100u32, 500, 1000] {
        let board = random_grid(size).to_dense();
        group.throughput(Throughput::Elements(u64::from(size) * u64::from(size)));
        group.bench_with_input(BenchmarkId::new("conway", size), &board, |b, board| {
            b.iter(|| step(board, &RuleSet::CONWAY));
        });
    }
    group.finish();
}

fn bench_to_dense(c: &mut Criterion) {
    let grid = random_grid(500);
    c.bench_function("grid/to_dense_500", |b| b.iter(|| grid.to_dense()));
}

fn bench_engine_round_trip(c: &mut Criterion) {
    c.bench_function("engine/manual_step_200", |b| {
        b.iter_custom(|iters| {
            let mut sim = Simulation::new(SimulationConfig {
                width: 200,
                height: 200,
                ..SimulationConfig::default()
            })
            .unwrap();
            let _ = sim.randomize_with(0.3, &mut StdRng::seed_from_u64(7));

            let start = Instant::now();
            for _ in 0..iters {
                sim.step_once().unwrap();
                sim.settle(Duration::from_secs(5)).unwrap();
            }
            let elapsed = start.elapsed();
            sim.shutdown();
            elapsed
        });
    });
}

criterion_group!(benches, bench_step, bench_to_dense, bench_engine_round_trip);
criterion_main!(benches);
