//! TimeSeries data structure for vegetation-index observations.

use crate::core::cadence::Cadence;
use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single observation. `value` is `None` when no valid observation exists,
/// which is distinct from a true zero reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: NaiveDate,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: NaiveDate, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }

    pub fn absent(timestamp: NaiveDate) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// An ordered, timestamp-unique series of samples for one AOI and one index.
///
/// The value array is never mutated after construction; fills and
/// decompositions produce new series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
    cadence: Cadence,
    index_name: Option<String>,
}

/// Builder for constructing TimeSeries.
#[derive(Debug, Clone)]
pub struct TimeSeriesBuilder {
    samples: Vec<Sample>,
    cadence: Cadence,
    index_name: Option<String>,
}

impl Default for TimeSeriesBuilder {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            cadence: Cadence::Monthly,
            index_name: None,
        }
    }
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(mut self, samples: Vec<Sample>) -> Self {
        self.samples = samples;
        self
    }

    pub fn sample(mut self, timestamp: NaiveDate, value: Option<f64>) -> Self {
        self.samples.push(Sample { timestamp, value });
        self
    }

    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Parse the cadence from its nominal name (e.g. `"monthly"`, `"10-day"`).
    pub fn cadence_str(mut self, cadence: &str) -> Result<Self> {
        self.cadence = cadence.parse()?;
        Ok(self)
    }

    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn build(self) -> TimeSeries {
        let mut ts = TimeSeries::from_samples(self.samples, self.cadence);
        ts.index_name = self.index_name;
        ts
    }
}

impl TimeSeries {
    /// Build a series from unordered ingestion output.
    ///
    /// Samples are sorted by timestamp; when a timestamp repeats, the sample
    /// appearing later in the input wins. Non-finite values are treated as
    /// absent.
    pub fn from_samples(mut samples: Vec<Sample>, cadence: Cadence) -> Self {
        // Stable sort keeps input order among equal timestamps.
        samples.sort_by_key(|s| s.timestamp);

        let mut timestamps: Vec<NaiveDate> = Vec::with_capacity(samples.len());
        let mut values: Vec<Option<f64>> = Vec::with_capacity(samples.len());
        for sample in samples {
            let value = sample.value.filter(|v| v.is_finite());
            if timestamps.last() == Some(&sample.timestamp) {
                if let Some(last) = values.last_mut() {
                    *last = value;
                }
            } else {
                timestamps.push(sample.timestamp);
                values.push(value);
            }
        }

        Self {
            timestamps,
            values,
            cadence,
            index_name: None,
        }
    }

    /// Build a series from aligned arrays, rejecting unordered timestamps.
    pub fn from_parts(
        timestamps: Vec<NaiveDate>,
        values: Vec<Option<f64>>,
        cadence: Cadence,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AnalysisError::TimestampError(
                "timestamps must be strictly increasing".to_string(),
            ));
        }

        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();

        Ok(Self {
            timestamps,
            values,
            cadence,
            index_name: None,
        })
    }

    pub(crate) fn with_index_name(mut self, name: Option<String>) -> Self {
        self.index_name = name;
        self
    }

    /// Derive a new series on the same timestamp axis.
    pub(crate) fn derive(&self, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != self.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }
        Ok(Self {
            timestamps: self.timestamps.clone(),
            values,
            cadence: self.cadence,
            index_name: self.index_name.clone(),
        })
    }

    /// Get the number of timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn timestamps(&self) -> &[NaiveDate] {
        &self.timestamps
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Iterate the series as samples.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.timestamps
            .iter()
            .zip(self.values.iter())
            .map(|(&timestamp, &value)| Sample { timestamp, value })
    }

    /// Number of present values.
    pub fn valid_count(&self) -> usize {
        self.samples().filter(Sample::is_present).count()
    }

    /// Number of absent values.
    pub fn missing_count(&self) -> usize {
        self.len() - self.valid_count()
    }

    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| v.is_none())
    }

    /// Present values in timestamp order.
    pub fn valid_values(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    /// Present `(timestamp, value)` pairs in timestamp order.
    pub fn valid_points(&self) -> Vec<(NaiveDate, f64)> {
        self.samples()
            .filter_map(|s| s.value.map(|v| (s.timestamp, v)))
            .collect()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDate> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDate> {
        self.timestamps.last().copied()
    }

    /// Values as a dense vector; fails if any value is absent.
    pub fn dense_values(&self) -> Result<Vec<f64>> {
        self.values
            .iter()
            .map(|v| v.ok_or(AnalysisError::MissingValues))
            .collect()
    }

    /// Copy with leading and trailing absent values removed.
    pub fn trimmed(&self) -> TimeSeries {
        let first = self.values.iter().position(|v| v.is_some());
        let last = self.values.iter().rposition(|v| v.is_some());
        match (first, last) {
            (Some(first), Some(last)) => TimeSeries {
                timestamps: self.timestamps[first..=last].to_vec(),
                values: self.values[first..=last].to_vec(),
                cadence: self.cadence,
                index_name: self.index_name.clone(),
            },
            _ => TimeSeries {
                timestamps: Vec::new(),
                values: Vec::new(),
                cadence: self.cadence,
                index_name: self.index_name.clone(),
            },
        }
    }
}
