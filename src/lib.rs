//! # ecotrend
//!
//! Vegetation-index trend analysis and landscape condition scoring per area of
//! interest (AOI).
//!
//! Repairs sparse index series onto a regular cadence, decomposes them into
//! trend, seasonal and residual parts, estimates a robust trend with a
//! Mann–Kendall significance test, and scores a land-cover raster from
//! intactness, fragmentation and diversity metrics.

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod landscape;
pub mod parallel;
pub mod pipeline;
pub mod scoring;
pub mod seasonality;
pub mod transform;
pub mod utils;

pub use error::{AnalysisError, Result};

pub mod prelude {
    pub use crate::config::{AnalysisConfig, LandscapeConfig, ScoreWeights, ScoringConfig};
    pub use crate::core::{Cadence, Sample, TimeSeries, TimeSeriesBuilder};
    pub use crate::error::{AnalysisError, Result};
    pub use crate::features::{
        SummaryStats, SummaryStatsCalculator, TrendDirection, TrendEstimator, TrendResult,
    };
    pub use crate::landscape::{GeoTransform, LandcoverRaster, LandscapeMetricEngine, MetricsResult};
    pub use crate::pipeline::{AoiAnalyzer, AoiInput, AoiOutcome, AoiReport};
    pub use crate::scoring::{RiskBand, ScoreComposer, ScoreResult};
    pub use crate::seasonality::{DecompositionResult, SeasonalDecomposer};
    pub use crate::transform::{GapFillResult, GapFiller};
}
