// Error types for sitecontent.
// Covers GitHub contents API failures, configuration problems and codec errors.

use thiserror::Error;

use crate::codec::CodecError;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("GitHub API error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Write conflict on {path}: {detail}")]
    Conflict { path: String, detail: String },

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Content decoding error: {0}")]
    Codec(#[from] CodecError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ContentError {
    /// Whether a failed write attempt may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ContentError::Conflict { .. } | ContentError::Http(_))
    }

    /// Whether the error means the remote file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
