//! Benchmarks for the per-frame CPU work: integration and the all-pairs link scan.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use driftfield::edges::build_edges;
use driftfield::particles::{FieldExtent, ParticleField, VelocitySpread};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn field(count: usize) -> ParticleField {
    let mut rng = StdRng::seed_from_u64(42);
    ParticleField::initialize(
        count,
        FieldExtent::square(25.0, 3.0),
        VelocitySpread::default(),
        &mut rng,
    )
    .unwrap()
}

fn bench_build_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_edges");

    for count in [100usize, 250, 500, 1000] {
        let field = field(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &field, |b, field| {
            b.iter(|| black_box(build_edges(field.positions(), 3.2)))
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut field = field(250);
    c.bench_function("tick_250", |b| b.iter(|| field.tick()));
}

criterion_group!(benches, bench_build_edges, bench_tick);
criterion_main!(benches);
