//! Series transformations.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use ecotrend::core::{Cadence, Sample, TimeSeries};
//! use ecotrend::transform::GapFiller;
//!
//! let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
//! let series = TimeSeries::from_samples(
//!     vec![Sample::new(d(1), 0.2), Sample::absent(d(2)), Sample::new(d(3), 0.4)],
//!     Cadence::Monthly,
//! );
//!
//! let filled = GapFiller::new().fill(&series).unwrap();
//! assert_eq!(filled.missing_count(), 1);
//! assert!(!filled.series().has_missing_values());
//! ```

pub mod gap_fill;

pub use gap_fill::{GapFillResult, GapFiller};
