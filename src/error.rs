//! Error types for unscan library.

use std::io;
use thiserror::Error;

/// Result type alias for unscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading token streams or running the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Token dump or report (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing a table as CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The input format could not be recognized.
    #[error("Unknown input format")]
    UnknownFormat,

    /// The input format was recognized but no reader is registered for it.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// A token stream violates the data model invariants.
    #[error("Malformed input on page {page}: {reason}")]
    MalformedInput {
        /// 0-based page index
        page: usize,
        /// What was wrong
        reason: String,
    },

    /// Processing was cancelled by the caller.
    #[error("Processing cancelled")]
    Cancelled,

    /// The pipeline could not start (e.g. the worker pool failed to build).
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error during rendering (text, CSV, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a malformed-input error for the given page.
    pub fn malformed(page: usize, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            page,
            reason: reason.into(),
        }
    }
}
