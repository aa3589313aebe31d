//! Core data structures for index time series.

mod cadence;
mod time_series;

pub use cadence::{years_between, Cadence, DAYS_PER_YEAR};
pub use time_series::{Sample, TimeSeries, TimeSeriesBuilder};
