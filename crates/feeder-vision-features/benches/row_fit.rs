//! Row fitting at realistic per-frame candidate counts.
//!
//! Run with: cargo bench -p feeder-vision-features

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use feeder_vision_core::{LengthUnit, RotatedRect, Size2, UnitsPerPixel};
use feeder_vision_features::{fit_row, ToleranceConfig};
use nalgebra::Point2;
use std::hint::black_box;

/// `n` pockets: two thirds on a 4 mm row, the rest scattered clutter.
fn synthetic_pockets(n: usize) -> Vec<RotatedRect> {
    let mut state = 0x9e37_79b9_u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as f64 / u32::MAX as f64
    };
    (0..n)
        .map(|k| {
            let center = if k % 3 == 2 {
                Point2::new(40.0 + 560.0 * next(), 40.0 + 400.0 * next())
            } else {
                Point2::new(40.0 + 40.0 * k as f64 + next(), 240.0 + next())
            };
            RotatedRect::new(center, Size2::new(20.0, 20.0), 2.0 * next() - 1.0)
        })
        .collect()
}

fn bench_fit_row(c: &mut Criterion) {
    let upp = UnitsPerPixel::isotropic(0.1, LengthUnit::Millimeters);
    let config = ToleranceConfig::for_pockets(4.0, 2.0);
    let mut group = c.benchmark_group("fit_row");
    for n in [10usize, 25, 50] {
        let pockets = synthetic_pockets(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &pockets, |b, pockets| {
            b.iter(|| fit_row(black_box(pockets), &upp, &config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fit_row);
criterion_main!(benches);
