//! Benchmarks for noise sampling and force evaluation.
//!
//! Run with: `cargo bench --bench noise`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use reverie::forces::{total_force, ForceField};
use reverie::noise::{self, PermutationTable};

fn bench_noise3(c: &mut Criterion) {
    let table = PermutationTable::with_seed(noise::DEFAULT_SEED);

    c.bench_function("noise3", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x += 0.37;
            black_box(table.noise3(black_box(x), 1.3, 0.7))
        })
    });
}

fn bench_curl_noise(c: &mut Criterion) {
    c.bench_function("curl_noise", |b| {
        let pos = Vec2::new(1280.0, 720.0);
        b.iter(|| black_box(noise::curl_noise(black_box(pos), 2.5, 50.0)))
    });

    c.bench_function("flow_direction", |b| {
        let pos = Vec2::new(1280.0, 720.0);
        b.iter(|| black_box(noise::flow_direction(black_box(pos), 2.5, noise::DEFAULT_FLOW_SCALE)))
    });
}

fn bench_force_stacks(c: &mut Criterion) {
    let mut group = c.benchmark_group("total_force");

    let curl = ForceField::default();
    let vortex = ForceField::Vortex {
        center: Vec2::new(1280.0, 720.0),
        attraction: 200.0,
        spiral: 80.0,
    };
    let flow = ForceField::Flow {
        scale: noise::DEFAULT_FLOW_SCALE,
        strength: 20.0,
    };

    let stacks: [(&str, Vec<ForceField>); 3] = [
        ("curl", vec![curl]),
        ("curl_vortex", vec![curl, vortex]),
        ("all", vec![curl, vortex, flow]),
    ];

    for (name, fields) in &stacks {
        group.bench_with_input(BenchmarkId::from_parameter(name), fields, |b, fields| {
            let pos = Vec2::new(400.0, 300.0);
            b.iter(|| black_box(total_force(fields, black_box(pos), 1.0)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_noise3, bench_curl_noise, bench_force_stacks);
criterion_main!(benches);
