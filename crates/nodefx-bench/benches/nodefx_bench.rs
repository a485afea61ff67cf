//! Benchmarks for the nodefx engines.
//!
//! Run with: `cargo bench -p nodefx-bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use nodefx_core::Image;
use nodefx_ops::resize::{Filter, resize_image};
use nodefx_ops::rng::hash_f32;
use nodefx_ops::*;

/// Hash-noise RGB test image.
fn test_image(width: u32, height: u32) -> Image {
    let data: Vec<f32> = (0..height)
        .flat_map(|y| (0..width * 3).map(move |i| hash_f32(i, y, 7)))
        .collect();
    Image::from_data(width, height, 3, data).expect("bench image")
}

fn pixels(img: &Image) -> Throughput {
    Throughput::Elements(img.pixel_count() as u64)
}

/// Benchmark the color grade at several sizes.
fn bench_grade(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade");
    let params = GradeParams {
        exposure: 0.3,
        temperature: 15.0,
        highlights: -20.0,
        shadows: 25.0,
        contrast: 1.2,
        hue: 30.0,
        saturation: 1.3,
        ..Default::default()
    };

    for size in [256u32, 512, 1024] {
        let img = test_image(size, size);
        group.throughput(pixels(&img));
        group.bench_with_input(BenchmarkId::new("full", size), &img, |b, img| {
            b.iter(|| grade(black_box(img), &params))
        });
    }

    group.finish();
}

/// Benchmark every distortion kind on one image.
fn bench_distort(c: &mut Criterion) {
    let mut group = c.benchmark_group("distort");
    let img = test_image(512, 512);
    group.throughput(pixels(&img));

    for kind in DistortKind::ALL {
        let params = DistortParams { kind: *kind, ..Default::default() };
        group.bench_with_input(BenchmarkId::from_parameter(kind), &img, |b, img| {
            b.iter(|| distort(black_box(img), &params))
        });
    }

    group.finish();
}

/// Benchmark edge detectors, with and without dilation.
fn bench_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("edges");
    let img = test_image(512, 512);
    group.throughput(pixels(&img));

    for algorithm in EdgeAlgorithm::ALL {
        for thickness in [1u32, 3] {
            let params = EdgeParams { algorithm: *algorithm, thickness, ..Default::default() };
            let id = BenchmarkId::new(algorithm.as_str(), thickness);
            group.bench_with_input(id, &img, |b, img| {
                b.iter(|| detect_edges(black_box(img), &params))
            });
        }
    }

    group.finish();
}

/// Benchmark blend modes, including the resampling path.
fn bench_blend(c: &mut Criterion) {
    let mut group = c.benchmark_group("blend");
    let base = test_image(512, 512);
    let overlay = test_image(512, 512);
    let small = test_image(200, 150);
    group.throughput(pixels(&base));

    for mode in [BlendMode::Normal, BlendMode::Overlay, BlendMode::SoftLight, BlendMode::ColorDodge] {
        group.bench_function(BenchmarkId::new("same_size", mode), |b| {
            b.iter(|| blend(black_box(&base), black_box(&overlay), mode, 0.8, None))
        });
    }

    group.bench_function("resampled_overlay", |b| {
        b.iter(|| blend(black_box(&base), black_box(&small), BlendMode::Multiply, 1.0, None))
    });

    group.finish();
}

/// Benchmark halftone effects.
fn bench_halftone(c: &mut Criterion) {
    let mut group = c.benchmark_group("halftone");
    let img = test_image(512, 512);
    group.throughput(pixels(&img));

    for effect in HalftoneEffect::ALL {
        let params = HalftoneParams { effect: *effect, ..Default::default() };
        group.bench_with_input(BenchmarkId::from_parameter(effect), &img, |b, img| {
            b.iter(|| halftone(black_box(img), &params))
        });
    }

    group.finish();
}

/// Benchmark resampling filters, downscale 2x.
fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");
    let img = test_image(1024, 1024);
    group.throughput(pixels(&img));

    for filter in [Filter::Nearest, Filter::Bilinear, Filter::Bicubic, Filter::Lanczos3] {
        group.bench_with_input(BenchmarkId::new("half", filter), &img, |b, img| {
            b.iter(|| resize_image(black_box(img), 512, 512, filter))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_grade,
    bench_distort,
    bench_edges,
    bench_blend,
    bench_halftone,
    bench_resize,
);
criterion_main!(benches);
