//! Gap filling onto a regular cadence.
//!
//! Irregular samples are assigned to the cadence slot containing them, then
//! interior gaps are filled by time-weighted linear interpolation between the
//! nearest valid neighbours. Edge gaps are never extrapolated.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::core::TimeSeries;
use crate::error::{AnalysisError, Result};

/// Output of a gap-filling pass.
///
/// Holds both the regularized raw series (before interpolation) and the filled
/// series on the same slot axis, so completeness can be reported later.
#[derive(Debug, Clone)]
pub struct GapFillResult {
    raw: TimeSeries,
    filled: TimeSeries,
    interpolated: Vec<bool>,
    missing_count: usize,
    leading_unfilled: usize,
    trailing_unfilled: usize,
}

impl GapFillResult {
    /// The gap-filled series. Edge gaps remain absent.
    pub fn series(&self) -> &TimeSeries {
        &self.filled
    }

    /// The slot-regularized series before interpolation.
    pub fn raw_slots(&self) -> &TimeSeries {
        &self.raw
    }

    /// Per-slot flag: `true` where the value was produced by interpolation.
    pub fn interpolated_mask(&self) -> &[bool] {
        &self.interpolated
    }

    /// Number of expected slots with no valid raw observation.
    pub fn missing_count(&self) -> usize {
        self.missing_count
    }

    /// Number of expected slots.
    pub fn expected_count(&self) -> usize {
        self.filled.len()
    }

    /// Number of slots holding at least one valid raw observation.
    pub fn present_count(&self) -> usize {
        self.expected_count() - self.missing_count
    }

    /// Number of slots filled by interpolation.
    pub fn interpolated_count(&self) -> usize {
        self.interpolated.iter().filter(|&&f| f).count()
    }

    /// Absent slots before the first valid observation.
    pub fn leading_unfilled(&self) -> usize {
        self.leading_unfilled
    }

    /// Absent slots after the last valid observation.
    pub fn trailing_unfilled(&self) -> usize {
        self.trailing_unfilled
    }

    /// Slots from the first to the last raw observation, inclusive. Edge gaps
    /// of a wider requested window are not counted.
    pub fn observed_count(&self) -> usize {
        self.expected_count() - self.leading_unfilled - self.trailing_unfilled
    }

    /// Share of the observed span that holds a raw observation, in percent.
    pub fn completeness_pct(&self) -> f64 {
        percent_of(self.present_count(), self.observed_count())
    }

    /// Share of the observed span filled by interpolation, in percent.
    pub fn gap_filled_pct(&self) -> f64 {
        percent_of(self.interpolated_count(), self.observed_count())
    }
}

fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

/// Repairs an irregular series onto its nominal cadence.
#[derive(Debug, Clone, Default)]
pub struct GapFiller {
    window: Option<(NaiveDate, NaiveDate)>,
}

impl GapFiller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an explicit window. Slots outside the observed span become
    /// flagged edge gaps; samples outside the window are ignored.
    pub fn with_window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.window = Some((start, end));
        self
    }

    /// Regularize and fill `series`.
    pub fn fill(&self, series: &TimeSeries) -> Result<GapFillResult> {
        let valid = series.valid_points();
        if valid.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                needed: 2,
                got: valid.len(),
            });
        }

        let (start, end) = match self.window {
            Some(window) => window,
            None => match (series.first_timestamp(), series.last_timestamp()) {
                (Some(first), Some(last)) => (first, last),
                _ => return Err(AnalysisError::EmptyData),
            },
        };
        if end < start {
            return Err(AnalysisError::InvalidParameter(format!(
                "window end {end} precedes start {start}"
            )));
        }

        let cadence = series.cadence();
        let slots = cadence.slots(start, end);
        let (first_slot, last_slot) = match (slots.first(), slots.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(AnalysisError::EmptyData),
        };

        // Average all valid samples falling into the same slot.
        let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        let mut outside = 0usize;
        for (timestamp, value) in valid {
            let slot = cadence.anchor(timestamp);
            if slot < first_slot || slot > last_slot {
                outside += 1;
                continue;
            }
            let entry = buckets.entry(slot).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        if outside > 0 {
            debug!(outside, "ignoring samples outside the requested window");
        }

        let raw_values: Vec<Option<f64>> = slots
            .iter()
            .map(|slot| buckets.get(slot).map(|&(sum, n)| sum / n as f64))
            .collect();

        let present = raw_values.iter().filter(|v| v.is_some()).count();
        if present < 2 {
            return Err(AnalysisError::InsufficientData {
                needed: 2,
                got: present,
            });
        }

        let filled_values = interpolate_interior(&slots, &raw_values);
        let interpolated: Vec<bool> = raw_values
            .iter()
            .zip(filled_values.iter())
            .map(|(raw, filled)| raw.is_none() && filled.is_some())
            .collect();

        let leading_unfilled = raw_values.iter().take_while(|v| v.is_none()).count();
        let trailing_unfilled = raw_values.iter().rev().take_while(|v| v.is_none()).count();
        if leading_unfilled > 0 || trailing_unfilled > 0 {
            warn!(
                leading_unfilled,
                trailing_unfilled, "edge gaps left unfilled; no extrapolation"
            );
        }

        let name = series.index_name().map(str::to_string);
        let raw = TimeSeries::from_parts(slots, raw_values, cadence)?.with_index_name(name);
        let filled = raw.derive(filled_values)?;

        let missing_count = raw.missing_count();
        debug!(
            expected = filled.len(),
            missing = missing_count,
            "gap filling complete"
        );

        Ok(GapFillResult {
            raw,
            filled,
            interpolated,
            missing_count,
            leading_unfilled,
            trailing_unfilled,
        })
    }
}

/// Time-weighted linear interpolation of interior absences.
///
/// Runs of absent values bounded by valid values on both sides are filled;
/// runs touching either edge are left absent.
fn interpolate_interior(timestamps: &[NaiveDate], values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = values.to_vec();
    let n = result.len();

    let mut i = 0;
    while i < n {
        if result[i].is_some() {
            i += 1;
            continue;
        }

        let start = i;
        while i < n && result[i].is_none() {
            i += 1;
        }
        let end = i;

        let left = if start > 0 { result[start - 1] } else { None };
        let right = if end < n { result[end] } else { None };

        if let (Some(l), Some(r)) = (left, right) {
            let t0 = timestamps[start - 1];
            let span = (timestamps[end] - t0).num_days() as f64;
            for idx in start..end {
                let t = (timestamps[idx] - t0).num_days() as f64 / span;
                result[idx] = Some(l + t * (r - l));
            }
        }
    }

    result
}
