//! Error types for the scoring engine

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main error type for scoring operations
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Sample timestamp is not strictly after the last buffered sample
    #[error("Out of order sample: {attempted} is not after {last}")]
    OutOfOrder {
        last: DateTime<Utc>,
        attempted: DateTime<Utc>,
    },

    /// Snapshot window larger than the buffer can ever hold
    #[error("Insufficient data: window {requested} exceeds capacity {capacity}")]
    InsufficientData {
        requested: usize,
        capacity: usize,
    },

    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Sample carries an unusable price
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScoringError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ScoringError::InvalidConfiguration(msg.into())
    }
}

/// Result type for scoring operations
pub type ScoringResult<T> = Result<T, ScoringError>;
