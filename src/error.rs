//! Error types for the ecotrend library.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while analysing an area of interest.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Too few valid points for the requested operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The raster has no usable coverage for the AOI.
    #[error("raster read error: {0}")]
    RasterRead(String),

    /// Invalid weights or malformed reference tables.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// An AOI ran past its wall-clock budget.
    #[error("time budget exceeded: {elapsed_ms} ms elapsed, budget {budget_ms} ms")]
    BudgetExceeded { elapsed_ms: u128, budget_ms: u128 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = AnalysisError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = AnalysisError::InsufficientData { needed: 3, got: 2 };
        assert_eq!(err.to_string(), "insufficient data: need at least 3, got 2");

        let err = AnalysisError::RasterRead("no valid cells".to_string());
        assert_eq!(err.to_string(), "raster read error: no valid cells");

        let err = AnalysisError::Config("weights sum to 0.9".to_string());
        assert_eq!(err.to_string(), "configuration error: weights sum to 0.9");

        let err = AnalysisError::DimensionMismatch {
            expected: 4,
            got: 3,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 4, got 3");

        let err = AnalysisError::BudgetExceeded {
            elapsed_ms: 120,
            budget_ms: 100,
        };
        assert_eq!(
            err.to_string(),
            "time budget exceeded: 120 ms elapsed, budget 100 ms"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = AnalysisError::MissingValues;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
