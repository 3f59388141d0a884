//! Integrator and section benchmarks
//!
//! - Throughput of RK4 against the Forest–Ruth composition on the saturated
//!   quartic oscillator
//! - Batch generation of nearby initial conditions on the rayon pool
//! - Poincaré section extraction over a long trajectory

use chaos4_core::section::{extract_crossings, CrossingDirection, Hyperplane};
use chaos4_core::systems::SaturatedSnapOscillator;
use chaos4_core::{IntegrationEngine, Method, State};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn bench_trajectory(c: &mut Criterion) {
    let engine = IntegrationEngine::new(SaturatedSnapOscillator::default());
    let y0 = State::new(0.1, 0.0, 0.0, 0.0);
    let mut group = c.benchmark_group("trajectory_100k_steps");
    for method in [Method::Rk4, Method::Symplectic] {
        group.bench_with_input(BenchmarkId::from_parameter(method), &method, |b, &method| {
            b.iter(|| {
                engine
                    .generate_trajectory(black_box(y0), (0.0, 100.0), 0.001, method)
                    .expect("trajectory")
            })
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let engine = IntegrationEngine::new(SaturatedSnapOscillator::default());
    let initial: Vec<State> = (0..16)
        .map(|i| State::new(0.1 + i as f64 * 1e-10, 0.0, 0.0, 0.0))
        .collect();
    c.bench_function("batch_16_trajectories", |b| {
        b.iter(|| {
            engine
                .generate_batch(black_box(&initial), (0.0, 20.0), 0.001, Method::Rk4)
                .expect("batch")
        })
    });
}

fn bench_section(c: &mut Criterion) {
    let engine = IntegrationEngine::new(SaturatedSnapOscillator::default());
    let trajectory = engine
        .generate_trajectory(State::new(0.1, 0.0, 0.0, 0.0), (0.0, 100.0), 0.001, Method::Rk4)
        .expect("trajectory");
    let plane = Hyperplane::new(2, 0.0, CrossingDirection::Increasing).expect("plane");
    c.bench_function("section_100k_states", |b| {
        b.iter(|| extract_crossings(black_box(&trajectory), &plane).expect("section"))
    });
}

criterion_group!(benches, bench_trajectory, bench_batch, bench_section);
criterion_main!(benches);
