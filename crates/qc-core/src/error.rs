//! Error types for connectome processing.

use thiserror::Error;

/// Errors raised by the connectome normalizations and label mapping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectomeError {
    /// Operation requires a square matrix.
    #[error("expected a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Matrix is too small to drop the requested leading rows/columns.
    #[error("matrix of size {size} has no regions past offset {offset}")]
    TooSmall { size: usize, offset: usize },

    /// Number of region values does not match the number of distinct labels.
    #[error("{values} region values cannot be mapped onto {labels} distinct labels")]
    LabelMismatch { values: usize, labels: usize },
}

/// Result type for connectome operations.
pub type Result<T> = std::result::Result<T, ConnectomeError>;
