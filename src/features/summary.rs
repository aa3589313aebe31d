//! Descriptive statistics of a gap-filled index series.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::TimeSeries;
use crate::error::{AnalysisError, Result};
use crate::seasonality::DecompositionResult;
use crate::transform::GapFillResult;
use crate::utils::stats::{mean, median, min_max, population_std_dev};

/// Summary statistics of one AOI's index series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation
    pub std: f64,
    /// Calendar month (1-12) with the highest mean across years
    pub peak_month: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Expected cadence slots in the window
    pub num_periods: usize,
    /// Slots holding a raw observation, in percent of the observed span
    pub completeness_pct: f64,
    /// Slots filled by interpolation, in percent of the observed span
    pub gap_filled_pct: f64,
    pub seasonal_amplitude: Option<f64>,
    pub residual_rms: Option<f64>,
}

/// Computes [`SummaryStats`] from a raw and a gap-filled series.
#[derive(Debug, Clone, Default)]
pub struct SummaryStatsCalculator;

impl SummaryStatsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Statistics over the defined values of the filled series.
    pub fn compute(&self, filled: &GapFillResult) -> Result<SummaryStats> {
        self.compute_series(filled.raw_slots(), filled.series())
    }

    /// Statistics over `filled`, with completeness taken from `raw`.
    ///
    /// Both series share one slot axis. The observed span runs from the first
    /// to the last raw observation; a single defined value gives degenerate
    /// statistics rather than an error.
    pub fn compute_series(&self, raw: &TimeSeries, filled: &TimeSeries) -> Result<SummaryStats> {
        if raw.len() != filled.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: filled.len(),
                got: raw.len(),
            });
        }
        let points = filled.valid_points();
        if points.is_empty() {
            return Err(AnalysisError::InsufficientData { needed: 1, got: 0 });
        }

        let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        let (min, max) = min_max(&values).ok_or(AnalysisError::EmptyData)?;
        let (start_date, end_date) = match (filled.first_timestamp(), filled.last_timestamp()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AnalysisError::EmptyData),
        };

        let observed = raw.trimmed().len();
        let interpolated = raw
            .values()
            .iter()
            .zip(filled.values())
            .filter(|(r, f)| r.is_none() && f.is_some())
            .count();

        Ok(SummaryStats {
            mean: mean(&values),
            median: median(&values),
            min,
            max,
            std: population_std_dev(&values),
            peak_month: peak_month(&points),
            start_date,
            end_date,
            num_periods: filled.len(),
            completeness_pct: percent_of(raw.valid_count(), observed),
            gap_filled_pct: percent_of(interpolated, observed),
            seasonal_amplitude: None,
            residual_rms: None,
        })
    }

    /// As [`compute`](Self::compute), adding the seasonal amplitude and residual
    /// RMS of a decomposition of the same series.
    pub fn compute_with_decomposition(
        &self,
        filled: &GapFillResult,
        decomposition: &DecompositionResult,
    ) -> Result<SummaryStats> {
        let mut stats = self.compute(filled)?;
        let amplitude = decomposition.seasonal_amplitude();
        let rms = decomposition.residual_rms();
        stats.seasonal_amplitude = amplitude.is_finite().then_some(amplitude);
        stats.residual_rms = rms.is_finite().then_some(rms);
        Ok(stats)
    }
}

fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

/// Climatological peak: the calendar month whose mean across all years is
/// highest. Ties go to the earliest month.
fn peak_month(points: &[(NaiveDate, f64)]) -> u32 {
    let mut by_month: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (date, value) in points {
        let entry = by_month.entry(date.month()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let mut best: Option<(u32, f64)> = None;
    for (month, (sum, count)) in by_month {
        let m = sum / count as f64;
        match best {
            Some((_, best_mean)) if m <= best_mean => {}
            _ => best = Some((month, m)),
        }
    }
    best.map(|(month, _)| month).unwrap_or(1)
}
