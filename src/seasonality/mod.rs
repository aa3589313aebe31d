//! Seasonal decomposition.
//!
//! Classical additive decomposition of a regular series into trend, seasonal
//! and residual components.

mod classical;

pub use classical::{DecompositionResult, SeasonalDecomposer};
