//! Benchmarks for the CPU side of a frame: sampling, spawning, tween
//! advancement, noise drift and hit-testing.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use image::{Rgba, RgbaImage};

use dotfield::camera::ViewRig;
use dotfield::field::{DotField, SpawnParams};
use dotfield::motion::MotionDriver;
use dotfield::settings::Assignment;
use dotfield::spawn::SpawnContext;
use dotfield::{hit_test, sample, Catalog};

const VIEWPORT: Vec2 = Vec2::new(1920.0, 1080.0);

/// A ring-shaped logo, roughly half the pixels opaque.
fn logo(size: u32) -> RgbaImage {
    let c = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let d = Vec2::new(x as f32 - c, y as f32 - c).length() / c;
        if (0.4..0.9).contains(&d) {
            Rgba([20, 80, 200, 255])
        } else {
            Rgba([255, 255, 255, 0])
        }
    })
}

fn field(step: u32, layers: u32) -> DotField {
    let sampling = sample(&logo(1024), step, VIEWPORT).expect("non-zero step");
    let params = SpawnParams {
        viewport: VIEWPORT,
        layer_count: layers,
        layer_spacing: 60.0,
        dot_size: 6.0,
        assignment: Assignment::RoundRobin,
    };
    DotField::spawn(&sampling, &Catalog::builtin().expect("built-in catalog"), &params, &mut SpawnContext::seeded(1), 0.0)
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    let image = logo(1024);
    for step in [4u32, 10, 20] {
        group.bench_with_input(BenchmarkId::from_parameter(step), &step, |b, &step| {
            b.iter(|| black_box(sample(&image, step, VIEWPORT)))
        });
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let driver = MotionDriver::default();

    for step in [10u32, 5] {
        let mut f = field(step, 2);
        group.bench_with_input(BenchmarkId::new("advance_and_drift", f.len()), &(), |b, _| {
            let mut frame = 0u64;
            b.iter(|| {
                frame += 2;
                let now = 0.5 + frame as f32 / 30.0;
                f.advance(now);
                driver.drive(&mut f, frame, now);
                black_box(f.len())
            })
        });
    }
    group.finish();
}

fn bench_hit_test(c: &mut Criterion) {
    let f = field(10, 2);
    let rig = ViewRig::new(0.8);
    c.bench_function("hit_test_miss", |b| {
        b.iter(|| {
            let points = f.iter().map(|d| rig.project(d.base_position(), VIEWPORT));
            black_box(hit_test(Vec2::new(5.0, 5.0), points))
        })
    });
}

criterion_group!(benches, bench_sample, bench_frame, bench_hit_test);
criterion_main!(benches);
