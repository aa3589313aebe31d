//! Features derived from a regularized index series.
//!
//! # Example
//!
//! ```
//! use chrono::{Months, NaiveDate};
//! use ecotrend::features::TrendEstimator;
//!
//! let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let points: Vec<_> = (0..24)
//!     .map(|i| (start + Months::new(i), 0.4 + 0.001 * i as f64))
//!     .collect();
//!
//! let trend = TrendEstimator::new().estimate_points(&points).unwrap();
//! assert!(trend.slope_per_year > 0.0);
//! assert!(trend.p_value < 0.01);
//! ```

pub mod summary;
pub mod trend;

pub use summary::{SummaryStats, SummaryStatsCalculator};
pub use trend::{mann_kendall, theil_sen, MannKendall, TrendDirection, TrendEstimator, TrendResult};
