use std::hint::black_box;

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sep_engine::algorithms::SpectralIntegralConverter;
use sep_engine::models::{EnergyBins, FluxSeries, ThresholdSet, Timestamp, SWPC_10_MEV};
use sep_engine::preprocessing::GapInterpolator;
use sep_engine::SepAnalysis;

fn dates(n: usize) -> Vec<Timestamp> {
    let start = Utc.with_ymd_and_hms(2017, 9, 4, 0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::minutes(5 * i as i64)).collect()
}

/// Event profile: quiet, fast rise, exponential decay
fn profile(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            if t < 0.2 {
                0.1
            } else {
                0.1 + 50.0 * (-(t - 0.2) * 8.0).exp()
            }
        })
        .collect()
}

/// Differential GOES-style series with every 17th sample flagged bad
fn differential_series(n: usize) -> FluxSeries {
    let bins = EnergyBins::differential(&[
        [4.2, 8.7],
        [8.7, 14.5],
        [15.0, 40.0],
        [38.0, 82.0],
        [84.0, 200.0],
        [110.0, 900.0],
        [330.0, 420.0],
        [420.0, 510.0],
        [510.0, 700.0],
        [700.0, -1.0],
    ])
    .unwrap();
    let spectrum = [10.0, 5.0, 1.0, 0.1, 1e-2, 1e-3, 1e-4, 1e-4, 1e-5, 1e-3];
    let shape = profile(n);

    let channels = spectrum
        .iter()
        .map(|f| {
            shape
                .iter()
                .enumerate()
                .map(|(i, p)| if i % 17 == 5 { -1.0 } else { p * f })
                .collect()
        })
        .collect();
    FluxSeries::from_raw(dates(n), channels, bins, -1.0).unwrap()
}

fn bench_gap_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("gap_repair");

    for n in [288, 2016, 8640] {
        let series = differential_series(n);
        group.bench_with_input(BenchmarkId::new("repair_series", n), &series, |b, series| {
            b.iter(|| GapInterpolator::repair_series(black_box(series)).unwrap());
        });
    }

    group.finish();
}

fn bench_spectral_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral_conversion");

    let converter = SpectralIntegralConverter::default();
    for n in [288, 2016, 8640] {
        let series = GapInterpolator::repair_series(&differential_series(n)).unwrap();
        group.bench_with_input(BenchmarkId::new("above_10_mev", n), &series, |b, series| {
            b.iter(|| converter.flux_above(black_box(series), &SWPC_10_MEV).unwrap());
        });
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    let analysis = SepAnalysis::new();
    let thresholds = ThresholdSet::operational();
    for n in [288, 2016, 8640] {
        let series = differential_series(n);
        group.bench_with_input(BenchmarkId::new("run", n), &series, |b, series| {
            b.iter(|| analysis.run(black_box(series), &thresholds).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_gap_repair,
    bench_spectral_conversion,
    bench_full_pipeline
);
criterion_main!(benches);
