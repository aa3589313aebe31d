//! Additive classical seasonal decomposition.
//!
//! Splits a regular series into three components:
//! - Trend: centred moving average over one seasonal period
//! - Seasonal: per-phase mean of the detrended values, centred to sum to zero
//! - Residual: what remains after removing trend and seasonal

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{Cadence, TimeSeries};
use crate::error::{AnalysisError, Result};
use crate::utils::stats::variance;

/// Result of a classical decomposition.
///
/// All component vectors share the timestamp axis of the input series. Trend
/// and residual are `None` within half a period of either end of the observed
/// span, and wherever the input itself is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    /// Timestamp axis of the decomposed series.
    pub timestamps: Vec<NaiveDate>,
    /// Input values.
    pub observed: Vec<Option<f64>>,
    /// Trend component.
    pub trend: Vec<Option<f64>>,
    /// Seasonal component, defined at every position.
    pub seasonal: Vec<f64>,
    /// Residual component.
    pub residual: Vec<Option<f64>>,
    /// Sample variance of the defined residuals.
    pub residual_variance: f64,
    /// Seasonal period used.
    pub period: usize,
}

impl DecompositionResult {
    /// Defined trend values with their timestamps.
    pub fn defined_trend(&self) -> Vec<(NaiveDate, f64)> {
        self.timestamps
            .iter()
            .zip(self.trend.iter())
            .filter_map(|(&t, v)| v.map(|v| (t, v)))
            .collect()
    }

    /// Defined residual values.
    pub fn defined_residuals(&self) -> Vec<f64> {
        self.residual.iter().flatten().copied().collect()
    }

    /// Peak-to-trough range of one seasonal cycle.
    pub fn seasonal_amplitude(&self) -> f64 {
        let cycle = &self.seasonal[..self.period.min(self.seasonal.len())];
        match crate::utils::stats::min_max(cycle) {
            Some((min, max)) => max - min,
            None => f64::NAN,
        }
    }

    /// Root mean square of the defined residuals.
    pub fn residual_rms(&self) -> f64 {
        crate::utils::stats::rms(&self.defined_residuals())
    }

    /// Get the seasonal strength (0 to 1).
    /// Values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        let (seasonal, residual): (Vec<f64>, Vec<f64>) = self
            .residual
            .iter()
            .zip(self.seasonal.iter())
            .filter_map(|(r, &s)| r.map(|r| (s + r, r)))
            .unzip();
        strength(&seasonal, &residual)
    }

    /// Get the trend strength (0 to 1).
    /// Values close to 1 indicate strong trend.
    pub fn trend_strength(&self) -> f64 {
        let (trend, residual): (Vec<f64>, Vec<f64>) = self
            .residual
            .iter()
            .zip(self.trend.iter())
            .filter_map(|(r, t)| match (r, t) {
                (Some(r), Some(t)) => Some((t + r, *r)),
                _ => None,
            })
            .unzip();
        strength(&trend, &residual)
    }
}

fn strength(component_plus_residual: &[f64], residual: &[f64]) -> f64 {
    let var_cr = variance(component_plus_residual);
    if var_cr.is_nan() || var_cr < 1e-10 {
        return 0.0;
    }
    let var_r = variance(residual);
    (1.0 - var_r / var_cr).clamp(0.0, 1.0)
}

/// Classical additive decomposer.
#[derive(Debug, Clone)]
pub struct SeasonalDecomposer {
    period: usize,
}

impl SeasonalDecomposer {
    /// Create a decomposer with an explicit seasonal period.
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Create a decomposer whose period is one year of `cadence`.
    pub fn for_cadence(cadence: Cadence) -> Self {
        Self::new(cadence.seasonal_period())
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Decompose a regularized series.
    ///
    /// Leading and trailing absences are tolerated; an absence between the
    /// first and last defined value is not.
    pub fn decompose(&self, series: &TimeSeries) -> Result<DecompositionResult> {
        let period = self.period;
        if period < 2 {
            return Err(AnalysisError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }

        let observed = series.values().to_vec();
        let n = observed.len();
        let (first, last) = match (
            observed.iter().position(|v| v.is_some()),
            observed.iter().rposition(|v| v.is_some()),
        ) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AnalysisError::InsufficientData {
                    needed: 2 * period,
                    got: 0,
                })
            }
        };

        let core: Vec<f64> = observed[first..=last]
            .iter()
            .map(|v| v.ok_or(AnalysisError::MissingValues))
            .collect::<Result<_>>()?;
        if core.len() < 2 * period {
            return Err(AnalysisError::InsufficientData {
                needed: 2 * period,
                got: core.len(),
            });
        }

        let mut trend = vec![None; n];
        for (offset, value) in centred_moving_average(&core, period)
            .into_iter()
            .enumerate()
        {
            trend[first + offset] = value;
        }

        // Per-phase mean of the detrended values, phase taken from the axis index.
        let mut phase_sum = vec![0.0; period];
        let mut phase_count = vec![0usize; period];
        for i in 0..n {
            if let (Some(x), Some(t)) = (observed[i], trend[i]) {
                phase_sum[i % period] += x - t;
                phase_count[i % period] += 1;
            }
        }
        let phase_mean: Vec<f64> = phase_sum
            .iter()
            .zip(phase_count.iter())
            .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
            .collect();
        let offset = phase_mean.iter().sum::<f64>() / period as f64;
        let centred: Vec<f64> = phase_mean.iter().map(|m| m - offset).collect();

        let seasonal: Vec<f64> = (0..n).map(|i| centred[i % period]).collect();

        let residual: Vec<Option<f64>> = (0..n)
            .map(|i| match (observed[i], trend[i]) {
                (Some(x), Some(t)) => Some(x - t - seasonal[i]),
                _ => None,
            })
            .collect();

        let defined: Vec<f64> = residual.iter().flatten().copied().collect();
        let residual_variance = if defined.len() < 2 {
            0.0
        } else {
            variance(&defined)
        };

        Ok(DecompositionResult {
            timestamps: series.timestamps().to_vec(),
            observed,
            trend,
            seasonal,
            residual,
            residual_variance,
            period,
        })
    }
}

impl Default for SeasonalDecomposer {
    fn default() -> Self {
        Self::new(12) // Monthly seasonality default
    }
}

/// Centred moving average spanning one period.
///
/// Odd periods average `period` points. Even periods average `period + 1`
/// points with half weight on both end points (the 2×m filter).
fn centred_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut result = vec![None; n];
    if n < 2 * half + 1 {
        return result;
    }

    for i in half..(n - half) {
        let window = &values[i - half..=i + half];
        let sum = if period % 2 == 0 {
            let inner: f64 = window[1..period].iter().sum();
            inner + 0.5 * (window[0] + window[period])
        } else {
            window.iter().sum()
        };
        result[i] = Some(sum / period as f64);
    }

    result
}
