//! Error types for QC input handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating and reading pipeline outputs.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required file (status record or descriptor) is missing.
    #[error("missing file: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === JSON Errors ===
    /// Status or descriptor JSON could not be parsed.
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // === Matrix Errors ===
    /// Text matrix could not be tokenized.
    #[error("failed to parse {path}: {source}")]
    Delimited {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A value in a text matrix is not a number.
    #[error("invalid number '{value}' at line {line} of {path}")]
    InvalidNumber {
        path: PathBuf,
        line: u64,
        value: String,
    },

    /// Matrix rows have different lengths.
    #[error("line {line} of {path} has {found} values, expected {expected}")]
    RaggedMatrix {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Matrix file holds no values.
    #[error("matrix file is empty: {path}")]
    EmptyMatrix { path: PathBuf },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
