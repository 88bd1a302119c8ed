//! Benchmarks for spectral correction, indices and spectral angle

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cropsight_algorithms::imagery::{
    compute_indices, correct_and_index, spectral_angle_anomaly, IndexParams, SpectralParams,
};
use cropsight_core::{BandStack, GeoTransform};
use ndarray::Array3;

/// Raw 16-bit counts of a field with a vegetation gradient and some texture
fn create_field(size: usize) -> BandStack {
    let spectrum = [0.05, 0.08, 0.1, 0.5, 0.25, 0.35, 0.45, 0.2];
    let mut data = Array3::zeros((size, size, spectrum.len()));
    for ((row, col, band), v) in data.indexed_iter_mut() {
        let vigor = col as f64 / size as f64;
        let noise = ((row * 7 + col * 13 + band) % 17) as f64 * 0.002;
        *v = (spectrum[band] * (0.5 + vigor) + noise) * 40000.0;
    }
    let mut stack = BandStack::from_array(data).unwrap();
    stack.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    stack
}

fn bench_correct_and_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/correct_and_index");
    for size in [128, 256, 512] {
        let raw = create_field(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| correct_and_index(black_box(&raw), &SpectralParams::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_indices(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/compute_indices");
    for size in [256, 512, 1024] {
        let stack = create_field(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| compute_indices(black_box(&stack), &IndexParams::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_spectral_angle(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/spectral_angle");
    for size in [256, 512, 1024] {
        let stack = create_field(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| spectral_angle_anomaly(black_box(&stack)).unwrap())
        });
    }
    group.finish();
}

fn bench_downsample(c: &mut Criterion) {
    let raw = create_field(1024);
    c.bench_function("imagery/downsample_1024_by_4", |b| {
        b.iter(|| black_box(&raw).downsample(4).unwrap())
    });
}

criterion_group!(
    benches,
    bench_correct_and_index,
    bench_indices,
    bench_spectral_angle,
    bench_downsample
);
criterion_main!(benches);
