//! Benchmarks for the CPU simulation step.
//!
//! Run with: `cargo bench --bench pool`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use reverie::forces::ForceField;
use reverie::pool::ParticlePool;
use reverie::{Driver, Emitter};

/// A pool filled to `count` long-lived particles.
fn filled_pool(count: usize) -> ParticlePool {
    let mut rng = StdRng::seed_from_u64(7);
    let mut pool = ParticlePool::new(count).with_force(ForceField::default());
    for _ in 0..count {
        let position = Vec2::new(rng.gen_range(0.0..2560.0), rng.gen_range(0.0..1440.0));
        let velocity = Vec2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
        pool.spawn(position, velocity, Vec4::ONE, 1.0e6, 2.0);
    }
    pool
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_update");

    for count in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut pool = filled_pool(count);
            b.iter(|| {
                pool.update(black_box(1.0 / 60.0));
                black_box(pool.len())
            })
        });
    }

    group.finish();
}

fn bench_driver_step(c: &mut Criterion) {
    c.bench_function("driver_step_steady_state", |b| {
        let pool = ParticlePool::new(10_000).with_force(ForceField::default());
        let emitters = Emitter::dream_scene(2560, 1440);
        let mut driver = Driver::new(pool, emitters, 0);
        // Warm up to a full pool.
        for _ in 0..700 {
            driver.step(1.0 / 60.0);
        }
        b.iter(|| driver.step(black_box(1.0 / 60.0)))
    });
}

criterion_group!(benches, bench_update, bench_driver_step);
criterion_main!(benches);
