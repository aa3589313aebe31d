//! Property-based tests for the analysis chain.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated series and rasters.

use chrono::{Months, NaiveDate};
use ecotrend::config::{ScoreWeights, ScoringConfig};
use ecotrend::core::{years_between, Cadence, Sample, TimeSeries};
use ecotrend::features::{TrendEstimator, TrendResult};
use ecotrend::landscape::{GeoTransform, LandcoverRaster, LandscapeMetricEngine, MetricsResult};
use ecotrend::scoring::{RiskBand, ScoreComposer};
use ecotrend::seasonality::SeasonalDecomposer;
use ecotrend::transform::GapFiller;
use proptest::prelude::*;

const NODATA: i32 = -9999;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
}

fn month(i: usize) -> NaiveDate {
    start() + Months::new(i as u32)
}

/// Create a monthly series, dropping values where `absent` is set.
fn make_series(values: &[f64], absent: &[bool]) -> TimeSeries {
    let samples = values
        .iter()
        .zip(absent.iter())
        .enumerate()
        .map(|(i, (&v, &gone))| {
            if gone {
                Sample::absent(month(i))
            } else {
                Sample::new(month(i), v)
            }
        })
        .collect();
    TimeSeries::from_samples(samples, Cadence::Monthly)
}

/// Strategy for index-like values with an absence mask whose ends are present.
fn gappy_series_strategy(
    min_len: usize,
    max_len: usize,
) -> impl Strategy<Value = (Vec<f64>, Vec<bool>)> {
    (min_len..max_len).prop_flat_map(|len| {
        (
            prop::collection::vec(-0.2..0.95_f64, len),
            prop::collection::vec(prop::bool::weighted(0.3), len),
        )
            .prop_map(|(values, mut absent)| {
                absent[0] = false;
                let last = absent.len() - 1;
                absent[last] = false;
                (values, absent)
            })
    })
}

/// Strategy for seasonal series with trend and noise.
fn seasonal_values_strategy(
    min_len: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (
            0.1..0.8_f64,
            -0.05..0.05_f64,
            0.0..0.3_f64,
            prop::collection::vec(-0.02..0.02_f64, len),
        )
            .prop_map(move |(base, slope, amplitude, noise)| {
                (0..len)
                    .map(|i| {
                        let phase = 2.0 * std::f64::consts::PI * (i % 12) as f64 / 12.0;
                        base + slope * i as f64 / 12.0 + amplitude * phase.sin() + noise[i]
                    })
                    .collect()
            })
    })
}

fn metrics(intactness_pct: f64, shannon: f64, fragmentation_norm: f64) -> MetricsResult {
    MetricsResult {
        intactness_pct,
        fragmentation_norm,
        shannon,
        valid_pixel_count: 1,
        total_pixel_count: 1,
        edge_density: 0.0,
        reference_edge_density: 100.0,
        simpson: 0.0,
        class_count: 1,
        patch_count: 1,
        nodata_fraction: 0.0,
    }
}

fn linear_trend(base: f64, slope: f64, n: usize) -> TrendResult {
    let points: Vec<_> = (0..n)
        .map(|i| (month(i), base + slope * years_between(start(), month(i))))
        .collect();
    TrendEstimator::new().estimate_points(&points).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn gap_filler_leaves_no_interior_absences((values, absent) in gappy_series_strategy(3, 60)) {
        let series = make_series(&values, &absent);
        let filled = GapFiller::new().fill(&series).unwrap();

        prop_assert_eq!(filled.series().len(), values.len());
        prop_assert!(!filled.series().has_missing_values());
        prop_assert_eq!(filled.missing_count(), absent.iter().filter(|&&a| a).count());
        prop_assert_eq!(filled.interpolated_count(), filled.missing_count());
    }

    #[test]
    fn interpolated_values_stay_within_observed_range(
        (values, absent) in gappy_series_strategy(3, 60)
    ) {
        let series = make_series(&values, &absent);
        let filled = GapFiller::new().fill(&series).unwrap();

        let observed = series.valid_values();
        let lo = observed.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = observed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for v in filled.series().values().iter().flatten() {
            prop_assert!(*v >= lo - 1e-12 && *v <= hi + 1e-12);
        }
    }

    #[test]
    fn edge_absences_are_left_unfilled(
        lead in 0usize..6,
        trail in 0usize..6,
        (values, absent) in gappy_series_strategy(3, 30),
    ) {
        let n = lead + values.len() + trail;
        let mut all_values = vec![0.0; lead];
        all_values.extend_from_slice(&values);
        all_values.extend(std::iter::repeat_n(0.0, trail));
        let mut all_absent = vec![true; lead];
        all_absent.extend_from_slice(&absent);
        all_absent.extend(std::iter::repeat_n(true, trail));

        let series = make_series(&all_values, &all_absent);
        let filled = GapFiller::new().fill(&series).unwrap();

        prop_assert_eq!(filled.series().len(), n);
        prop_assert_eq!(filled.leading_unfilled(), lead);
        prop_assert_eq!(filled.trailing_unfilled(), trail);
        prop_assert_eq!(filled.series().missing_count(), lead + trail);
    }

    #[test]
    fn decomposition_reconstructs_input(values in seasonal_values_strategy(24, 96)) {
        let series = make_series(&values, &vec![false; values.len()]);
        let d = SeasonalDecomposer::new(12).decompose(&series).unwrap();

        for i in 0..values.len() {
            if let (Some(t), Some(r)) = (d.trend[i], d.residual[i]) {
                prop_assert!((t + d.seasonal[i] + r - values[i]).abs() < 1e-9);
            }
        }
        let cycle_sum: f64 = d.seasonal[..12].iter().sum();
        prop_assert!(cycle_sum.abs() < 1e-9);
        prop_assert!(d.trend[..6].iter().all(|t| t.is_none()));
        prop_assert!(d.trend[values.len() - 6..].iter().all(|t| t.is_none()));
    }

    #[test]
    fn linear_trend_is_recovered(
        base in -1.0..1.0_f64,
        slope in prop_oneof![-0.5..-0.001_f64, 0.001..0.5_f64],
        n in 10usize..60,
    ) {
        let trend = linear_trend(base, slope, n);
        prop_assert!((trend.slope_per_year - slope).abs() < 1e-6);
        prop_assert!(trend.p_value < 0.01);
    }

    #[test]
    fn constant_trend_has_unit_p_value(level in -1.0..1.0_f64, n in 3usize..40) {
        let trend = linear_trend(level, 0.0, n);
        prop_assert_eq!(trend.slope_per_year, 0.0);
        prop_assert_eq!(trend.p_value, 1.0);
    }

    #[test]
    fn p_value_is_a_probability(values in prop::collection::vec(-1.0..1.0_f64, 3..50)) {
        let points: Vec<_> = values.iter().enumerate().map(|(i, &v)| (month(i), v)).collect();
        let trend = TrendEstimator::new().estimate_points(&points).unwrap();
        prop_assert!((0.0..=1.0).contains(&trend.p_value));
    }

    #[test]
    fn shannon_is_bounded_by_ln_class_count(
        cells in prop::collection::vec(prop_oneof![Just(NODATA), 1..8i32], 16..400)
    ) {
        prop_assume!(cells.iter().any(|&c| c != NODATA));
        let n = cells.len();
        let raster = LandcoverRaster::new(1, n, cells, NODATA, GeoTransform::default()).unwrap();
        let m = LandscapeMetricEngine::new(Default::default()).unwrap().compute(&raster).unwrap();

        prop_assert!(m.shannon >= 0.0);
        prop_assert!(m.shannon <= (m.class_count as f64).ln() + 1e-12);
        prop_assert!((0.0..=100.0).contains(&m.intactness_pct));
        prop_assert!(m.fragmentation_norm >= 0.0);
        prop_assert_eq!(m.total_pixel_count, n);
    }

    #[test]
    fn equal_classes_reach_ln_k(k in 1usize..8, reps in 1usize..20) {
        let cells: Vec<i32> = (0..k * reps).map(|i| (i % k) as i32).collect();
        let raster = LandcoverRaster::new(reps, k, cells, NODATA, GeoTransform::default()).unwrap();
        let m = LandscapeMetricEngine::new(Default::default()).unwrap().compute(&raster).unwrap();
        prop_assert!((m.shannon - (k as f64).ln()).abs() < 1e-6);
    }

    #[test]
    fn score_is_monotone(
        intactness in 0.0..100.0_f64,
        shannon in 0.0..2.5_f64,
        fragmentation in 0.0..2.0_f64,
        delta in 0.0..50.0_f64,
        wi in 0.0..1.0_f64,
        ws in 0.0..1.0_f64,
    ) {
        let wf = (1.0 - wi - ws).max(0.0);
        let total = wi + ws + wf;
        let weights = ScoreWeights::new(wi / total, ws / total, wf / total);
        prop_assume!(weights.validate().is_ok());
        let composer = ScoreComposer::new(ScoringConfig::new().with_weights(weights)).unwrap();

        let base = composer.compose(&metrics(intactness, shannon, fragmentation), None, None);
        let more_intact = composer.compose(&metrics(intactness + delta, shannon, fragmentation), None, None);
        let more_diverse = composer.compose(&metrics(intactness, shannon + delta / 20.0, fragmentation), None, None);
        let more_fragmented = composer.compose(&metrics(intactness, shannon, fragmentation + delta / 20.0), None, None);

        prop_assert!(more_intact.score >= base.score - 1e-9);
        prop_assert!(more_diverse.score >= base.score - 1e-9);
        prop_assert!(more_fragmented.score <= base.score + 1e-9);
        prop_assert!((0.0..=100.0).contains(&base.score));
        prop_assert_eq!(base.band, RiskBand::from_score(base.score));
    }

    #[test]
    fn redistributed_weights_keep_their_total(
        wi in 0.01..1.0_f64,
        ws in 0.0..1.0_f64,
        wf in 0.0..1.0_f64,
        wt in 0.0..1.0_f64,
        wm in 0.0..1.0_f64,
        has_trend: bool,
        has_msa: bool,
    ) {
        let total = wi + ws + wf + wt + wm;
        let weights = ScoreWeights::new(wi / total, ws / total, wf / total)
            .with_trend(wt / total)
            .with_msa(wm / total);
        prop_assert!(weights.validate().is_ok());

        let applied = weights.redistributed(has_trend, has_msa);
        prop_assert!((applied.sum() - 1.0).abs() < 1e-9);
        if !has_trend {
            prop_assert_eq!(applied.trend, 0.0);
        }
        if !has_msa {
            prop_assert_eq!(applied.msa, 0.0);
        }
        prop_assert!(applied.intactness >= weights.intactness);
    }
}
