//! Error types for MediaSyncer.

use thiserror::Error;

/// Main error type for MediaSyncer operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for MediaSyncer operations.
pub type Result<T> = std::result::Result<T, SyncError>;
