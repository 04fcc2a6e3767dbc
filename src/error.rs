//! Error types for Worktrace Flux

use thiserror::Error;

/// Errors that can occur during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Failed to parse samples: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Samples are not sorted by timestamp: sample {index} is earlier than its predecessor")]
    UnsortedSamples { index: usize },

    #[error("Bucket width must be positive, got {0}")]
    InvalidBucketWidth(u32),

    #[error("Invalid configuration value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("Invalid sample {index}: {message}")]
    InvalidSample { index: usize, message: String },

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
