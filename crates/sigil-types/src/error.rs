//! Error types for sigil-types

use thiserror::Error;

/// Errors that can occur in sigil-types
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid or unsupported bundle media type
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    /// Malformed encoded value (hex, base64, PEM, fixed-size field)
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Malformed checkpoint envelope
    #[error("Invalid checkpoint format: {0}")]
    InvalidCheckpoint(String),

    /// Structural validation failure
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for sigil-types operations
pub type Result<T> = std::result::Result<T, Error>;
