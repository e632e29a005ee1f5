//! Benchmark for collision and integration over a near subset.
//!
//! Collision is quadratic in the subset size, so the subset sizes here
//! bracket what the simulation distance usually admits.
//!
//! Run with: cargo bench --package splat_sim --bench collision_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use splat_core::{IdAllocator, Material, Record, RecordBlueprint, Vec3};
use splat_sim::{collide_in_place, integrate, SimulationParams};

fn near_subset(count: usize) -> Vec<Record> {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut ids = IdAllocator::default();
    (0..count)
        .map(|i| {
            let material = if i % 4 == 0 { Material::Movable } else { Material::Immovable };
            let position = Vec3::new(
                rng.gen_range(-15.0..15.0),
                rng.gen_range(0.0..10.0),
                rng.gen_range(-15.0..15.0),
            );
            let mut record = ids.create(&RecordBlueprint::new(position, Vec3::splat(0.2), material)).unwrap();
            record.distance = position.length();
            record
        })
        .collect()
}

fn bench_collide(c: &mut Criterion) {
    let params = SimulationParams::default();
    let mut group = c.benchmark_group("collide_in_place");
    group.sample_size(20);
    for count in [500usize, 2_000, 5_000] {
        let mut records = near_subset(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(collide_in_place(&mut records, true, &params)));
        });
    }
    group.finish();
}

fn bench_integrate(c: &mut Criterion) {
    let params = SimulationParams::default();
    let mut records = near_subset(50_000);
    c.bench_function("integrate_50k", |b| {
        b.iter(|| black_box(integrate(&mut records, 0.016, &params)));
    });
}

criterion_group!(benches, bench_collide, bench_integrate);
criterion_main!(benches);
