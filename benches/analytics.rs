//! Benchmarks for the per-AOI analysis stages.

use chrono::{Months, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ecotrend::config::{AnalysisConfig, LandscapeConfig};
use ecotrend::core::{Cadence, Sample, TimeSeries};
use ecotrend::features::TrendEstimator;
use ecotrend::landscape::{GeoTransform, LandcoverRaster, LandscapeMetricEngine};
use ecotrend::pipeline::{AoiAnalyzer, AoiInput};
use ecotrend::seasonality::SeasonalDecomposer;
use ecotrend::transform::GapFiller;

fn generate_samples(n: usize) -> Vec<Sample> {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    (0..n)
        .map(|i| {
            let d = start + Months::new(i as u32);
            if i % 7 == 3 {
                Sample::absent(d)
            } else {
                let season = 0.2 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
                Sample::new(d, 0.4 + 0.001 * i as f64 + season)
            }
        })
        .collect()
}

fn generate_raster(side: usize) -> LandcoverRaster {
    let cells: Vec<i32> = (0..side * side)
        .map(|i| ((i / side / 7 + i % side / 5) % 4) as i32 + 1)
        .collect();
    LandcoverRaster::new(side, side, cells, 0, GeoTransform::new(0.0, 0.0, 10.0, -10.0)).unwrap()
}

fn bench_series_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_stages");

    for size in [36, 120, 360].iter() {
        let series = TimeSeries::from_samples(generate_samples(*size), Cadence::Monthly);
        let filled = GapFiller::new().fill(&series).unwrap();
        let decomposition = SeasonalDecomposer::new(12).decompose(filled.series()).unwrap();

        group.bench_with_input(BenchmarkId::new("gap_fill", size), size, |b, _| {
            b.iter(|| GapFiller::new().fill(black_box(&series)))
        });

        group.bench_with_input(BenchmarkId::new("decompose", size), size, |b, _| {
            let decomposer = SeasonalDecomposer::new(12);
            b.iter(|| decomposer.decompose(black_box(filled.series())))
        });

        group.bench_with_input(BenchmarkId::new("trend", size), size, |b, _| {
            let estimator = TrendEstimator::new();
            b.iter(|| estimator.estimate(black_box(&decomposition)))
        });
    }

    group.finish();
}

fn bench_landscape(c: &mut Criterion) {
    let mut group = c.benchmark_group("landscape_metrics");
    let engine = LandscapeMetricEngine::new(LandscapeConfig::default()).unwrap();

    for side in [100, 500, 1000].iter() {
        let raster = generate_raster(*side);
        group.bench_with_input(BenchmarkId::from_parameter(side), side, |b, _| {
            b.iter(|| engine.compute(black_box(&raster)))
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let analyzer = AoiAnalyzer::new(AnalysisConfig::default()).unwrap();
    let inputs: Vec<AoiInput> = (0..32)
        .map(|i| {
            AoiInput::new(format!("aoi-{i}"), generate_samples(120), "monthly")
                .with_landcover(generate_raster(200))
        })
        .collect();

    c.bench_function("analyze_batch_32", |b| {
        b.iter(|| analyzer.analyze_batch(black_box(&inputs)))
    });
}

criterion_group!(benches, bench_series_stages, bench_landscape, bench_batch);
criterion_main!(benches);
