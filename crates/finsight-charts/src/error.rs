//! Error types for chart rendering

use thiserror::Error;

/// Chart rendering errors
#[derive(Debug, Error)]
pub enum ChartError {
    /// Drawing backend failure
    #[error("Render error: {0}")]
    Render(String),

    /// Filesystem failure writing or reading the image
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input data rejected before rendering
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for chart operations
pub type Result<T> = std::result::Result<T, ChartError>;
