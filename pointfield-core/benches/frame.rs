//! Benchmarks for a full frame and its passes.
//!
//! Run with: `cargo bench -p pointfield-core`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use pointfield_core::integrator::{self, StepParams};
use pointfield_core::tests::test_helpers::seeded_rng;
use pointfield_core::{ParticleStore, PixelBuffer, SimulationStep};

const WIDTH: usize = 1280;
const HEIGHT: usize = 720;

fn seeded_store(count: usize) -> ParticleStore {
    ParticleStore::initialize_with_rng(count, WIDTH as f32, HEIGHT as f32, &mut seeded_rng(0))
        .expect("bench store")
}

fn bench_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_frame");
    group.sample_size(20);

    for count in [10_000, 100_000, 1_000_000] {
        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "serial" };
            group.bench_with_input(BenchmarkId::new(label, count), &count, |b, &count| {
                let mut store = seeded_store(count);
                let mut pixels = PixelBuffer::new(WIDTH, HEIGHT).expect("bench pixels");
                let step = SimulationStep::new(parallel);
                store.update_frame_input(
                    1.0 / 60.0,
                    WIDTH as f32 / 2.0,
                    HEIGHT as f32 / 2.0,
                    true,
                    WIDTH as f32,
                    HEIGHT as f32,
                );
                b.iter(|| black_box(step.update(&mut store, &mut pixels)))
            });
        }
    }

    group.finish();
}

fn bench_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("passes");
    group.sample_size(20);

    let mut store = seeded_store(1_000_000);
    let params = StepParams {
        dt: 1.0 / 60.0,
        decay: integrator::decay(1.0 / 60.0),
        pointer: Some(Vec2::new(640.0, 360.0)),
        extent: Vec2::new(WIDTH as f32, HEIGHT as f32),
    };

    group.bench_function("physics", |b| {
        b.iter(|| integrator::step(store.particles_mut(), black_box(&params), true))
    });

    let mut pixels = PixelBuffer::new(WIDTH, HEIGHT).expect("bench pixels");
    group.bench_function("composite", |b| {
        b.iter(|| black_box(pixels.composite_with(store.particles(), true)))
    });

    group.finish();
}

criterion_group!(benches, bench_full_frame, bench_passes);
criterion_main!(benches);
