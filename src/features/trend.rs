//! Robust trend estimation over a decomposed trend component.
//!
//! The slope is the Theil–Sen estimator (median of pairwise slopes) with time
//! in years; significance is the Mann–Kendall test with tie correction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::years_between;
use crate::error::{AnalysisError, Result};
use crate::seasonality::DecompositionResult;
use crate::utils::stats::{median, two_sided_p_value};

/// Direction of a monotonic trend at a given significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    NoTrend,
}

/// Result of trend estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Theil–Sen slope in index units per year
    pub slope_per_year: f64,
    /// Theil–Sen intercept at the first timestamp
    pub intercept: f64,
    /// Two-sided Mann–Kendall p-value
    pub p_value: f64,
    /// Last defined trend value minus the first
    pub delta: f64,
    /// Mann–Kendall S statistic
    pub mk_statistic: i64,
    /// Variance of S under the null, tie-corrected
    pub mk_variance: f64,
    /// Continuity-corrected standardized S
    pub z_score: f64,
    /// Kendall's tau-a between time and value
    pub kendall_tau: f64,
    /// Number of trend points used
    pub n_points: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TrendResult {
    /// Whether the trend is significant at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Direction of the trend at level `alpha`.
    pub fn direction(&self, alpha: f64) -> TrendDirection {
        if !self.is_significant(alpha) || self.slope_per_year == 0.0 {
            TrendDirection::NoTrend
        } else if self.slope_per_year > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

/// Estimates slope, significance and net change of a trend component.
#[derive(Debug, Clone, Default)]
pub struct TrendEstimator;

impl TrendEstimator {
    /// Minimum number of defined trend points.
    pub const MIN_POINTS: usize = 3;

    pub fn new() -> Self {
        Self
    }

    /// Estimate from the defined trend values of a decomposition.
    pub fn estimate(&self, decomposition: &DecompositionResult) -> Result<TrendResult> {
        self.estimate_points(&decomposition.defined_trend())
    }

    /// Estimate from `(timestamp, value)` points with strictly increasing
    /// timestamps.
    pub fn estimate_points(&self, points: &[(NaiveDate, f64)]) -> Result<TrendResult> {
        let n = points.len();
        if n < Self::MIN_POINTS {
            return Err(AnalysisError::InsufficientData {
                needed: Self::MIN_POINTS,
                got: n,
            });
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(AnalysisError::TimestampError(
                "trend timestamps must be strictly increasing".to_string(),
            ));
        }
        if points.iter().any(|(_, v)| !v.is_finite()) {
            return Err(AnalysisError::InvalidParameter(
                "trend values must be finite".to_string(),
            ));
        }

        let start = points[0].0;
        let end = points[n - 1].0;
        let years: Vec<f64> = points.iter().map(|(t, _)| years_between(start, *t)).collect();
        let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();

        let (mut slope, mut intercept) = theil_sen(&years, &values);
        let mk = mann_kendall(&values);

        if mk.variance <= 0.0 {
            // Every value tied: a flat series.
            slope = 0.0;
            intercept = values[0];
        }

        let pairs = (n * (n - 1) / 2) as f64;

        Ok(TrendResult {
            slope_per_year: slope,
            intercept,
            p_value: mk.p_value,
            delta: values[n - 1] - values[0],
            mk_statistic: mk.statistic,
            mk_variance: mk.variance,
            z_score: mk.z_score,
            kendall_tau: mk.statistic as f64 / pairs,
            n_points: n,
            start,
            end,
        })
    }
}

/// Theil–Sen slope and intercept of `y` against `x`.
///
/// The intercept is the median of `y - slope * x`.
pub fn theil_sen(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len().min(y.len());
    let mut slopes = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[j] - x[i];
            if dx != 0.0 {
                slopes.push((y[j] - y[i]) / dx);
            }
        }
    }
    if slopes.is_empty() {
        return (f64::NAN, f64::NAN);
    }

    let slope = median(&slopes);
    let residuals: Vec<f64> = x[..n]
        .iter()
        .zip(y[..n].iter())
        .map(|(&xi, &yi)| yi - slope * xi)
        .collect();
    (slope, median(&residuals))
}

/// Mann–Kendall test output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MannKendall {
    pub statistic: i64,
    pub variance: f64,
    pub z_score: f64,
    pub p_value: f64,
}

/// Mann–Kendall monotonic trend test on values ordered in time.
///
/// Var(S) = [n(n-1)(2n+5) - Σ t(t-1)(2t+5)] / 18 where t runs over the sizes
/// of groups of tied values.
pub fn mann_kendall(values: &[f64]) -> MannKendall {
    let n = values.len();
    let mut s: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let diff = values[j] - values[i];
            if diff > 0.0 {
                s += 1;
            } else if diff < 0.0 {
                s -= 1;
            }
        }
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut tie_term = 0.0;
    let mut run = 1usize;
    for k in 1..=sorted.len() {
        if k < sorted.len() && sorted[k] == sorted[k - 1] {
            run += 1;
        } else {
            if run > 1 {
                let t = run as f64;
                tie_term += t * (t - 1.0) * (2.0 * t + 5.0);
            }
            run = 1;
        }
    }

    let nf = n as f64;
    let variance = ((nf * (nf - 1.0) * (2.0 * nf + 5.0) - tie_term) / 18.0).max(0.0);

    if s == 0 || variance <= 0.0 {
        return MannKendall {
            statistic: s,
            variance,
            z_score: 0.0,
            p_value: 1.0,
        };
    }

    let corrected = if s > 0 { s - 1 } else { s + 1 };
    let z_score = corrected as f64 / variance.sqrt();

    MannKendall {
        statistic: s,
        variance,
        z_score,
        p_value: two_sided_p_value(z_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Months;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
    }

    fn monthly_points(f: impl Fn(f64) -> f64, n: usize) -> Vec<(NaiveDate, f64)> {
        (0..n)
            .map(|i| {
                let d = start() + Months::new(i as u32);
                (d, f(years_between(start(), d)))
            })
            .collect()
    }

    #[test]
    fn linear_series_recovers_exact_slope() {
        let points = monthly_points(|t| 0.5 + 0.03 * t, 24);
        let result = TrendEstimator::new().estimate_points(&points).unwrap();

        assert_relative_eq!(result.slope_per_year, 0.03, epsilon = 1e-6);
        assert_relative_eq!(result.intercept, 0.5, epsilon = 1e-9);
        assert!(result.p_value < 0.01, "p = {}", result.p_value);
        assert_eq!(result.mk_statistic, 276);
        assert_relative_eq!(result.kendall_tau, 1.0);
        assert_eq!(result.direction(0.05), TrendDirection::Increasing);
    }

    #[test]
    fn decreasing_series_is_detected() {
        let points = monthly_points(|t| 0.8 - 0.1 * t, 30);
        let result = TrendEstimator::new().estimate_points(&points).unwrap();

        assert_relative_eq!(result.slope_per_year, -0.1, epsilon = 1e-6);
        assert!(result.delta < 0.0);
        assert_eq!(result.direction(0.05), TrendDirection::Decreasing);
    }

    #[test]
    fn constant_series_has_zero_slope_and_unit_p_value() {
        let points = monthly_points(|_| 0.42, 12);
        let result = TrendEstimator::new().estimate_points(&points).unwrap();

        assert_eq!(result.slope_per_year, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert_eq!(result.delta, 0.0);
        assert_eq!(result.mk_statistic, 0);
        assert_eq!(result.direction(0.05), TrendDirection::NoTrend);
    }

    #[test]
    fn delta_is_last_minus_first_not_annualized() {
        let points = vec![
            (start(), 1.0),
            (start() + Months::new(6), 3.0),
            (start() + Months::new(30), 2.5),
        ];
        let result = TrendEstimator::new().estimate_points(&points).unwrap();
        assert_relative_eq!(result.delta, 1.5);
    }

    #[test]
    fn theil_sen_resists_outliers() {
        let mut points = monthly_points(|t| 1.0 + 0.2 * t, 20);
        points[10].1 += 50.0;
        let result = TrendEstimator::new().estimate_points(&points).unwrap();
        assert_relative_eq!(result.slope_per_year, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn tie_correction_reduces_variance() {
        let mk = mann_kendall(&[1.0, 2.0, 2.0, 3.0]);
        assert_eq!(mk.statistic, 5);
        // (4*3*13 - 2*1*9) / 18
        assert_relative_eq!(mk.variance, 138.0 / 18.0, epsilon = 1e-12);
        assert_relative_eq!(mk.z_score, 4.0 / (138.0_f64 / 18.0).sqrt(), epsilon = 1e-12);
        assert!(mk.p_value > 0.1 && mk.p_value < 0.2);
    }

    #[test]
    fn fewer_than_three_points_is_insufficient() {
        let points = monthly_points(|t| t, 2);
        assert!(matches!(
            TrendEstimator::new().estimate_points(&points),
            Err(AnalysisError::InsufficientData { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn unordered_timestamps_are_rejected() {
        let mut points = monthly_points(|t| t, 5);
        points.swap(1, 2);
        assert!(matches!(
            TrendEstimator::new().estimate_points(&points),
            Err(AnalysisError::TimestampError(_))
        ));
    }

    #[test]
    fn p_value_is_a_probability() {
        let points = monthly_points(|t| (7.0 * t).sin(), 40);
        let result = TrendEstimator::new().estimate_points(&points).unwrap();
        assert!((0.0..=1.0).contains(&result.p_value));
    }
}
