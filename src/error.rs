//! Error types for the site behavior layer

use thiserror::Error;

/// Result type alias for site operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the boundaries of the behavior layer.
///
/// None of these are fatal to a page: the `Site` controller logs them and
/// degrades the affected feature.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Durable storage could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A storage write was refused because the store is full
    #[error("Storage quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },

    /// Stored or injected data could not be decoded
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Failed to load a page description
    #[error("Failed to load page: {0}")]
    LoadError(String),

    /// The submission collaborator rejected a message
    #[error("Submission failed: {0}")]
    SubmissionError(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedData(err.to_string())
    }
}
