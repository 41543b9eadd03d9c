//! Error types for the batchscan-core library.
//!
//! Extraction itself never fails; these cover parsing user-supplied batch
//! codes and loading configuration.

use thiserror::Error;

/// Main error type for the batchscan library.
#[derive(Error, Debug)]
pub enum BatchscanError {
    /// A string could not be turned into a batch code.
    #[error("invalid batch code: {0}")]
    InvalidBatchCode(#[from] BatchCodeError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a string is not a canonical batch code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchCodeError {
    #[error("batch code is empty")]
    Empty,

    /// Wrong number of characters.
    #[error("expected 10 characters, got {0}")]
    Length(usize),

    /// First character is not `5`.
    #[error("must start with '5', found '{0}'")]
    Prefix(char),

    /// A character outside `[A-Z0-9]`.
    #[error("invalid character '{ch}' at position {position}")]
    Charset { ch: char, position: usize },
}

/// Result type for the batchscan library.
pub type Result<T> = std::result::Result<T, BatchscanError>;
