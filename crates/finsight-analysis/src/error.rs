//! Error types for analysis computations

use thiserror::Error;

/// Analysis specific errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Indicator name not recognized
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    /// Financial metric name not recognized
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Window size invalid for the requested computation
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// Input series is empty or too short
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Indicator construction or evaluation failed
    #[error("Indicator error: {0}")]
    Indicator(String),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
