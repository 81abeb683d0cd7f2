//! Error types for sigil-trust

use thiserror::Error;

/// Errors that can occur handling trust material
#[derive(Error, Debug)]
pub enum Error {
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A validity period timestamp failed to parse
    #[error("Invalid validity period: {0}")]
    InvalidValidityPeriod(String),

    /// A log id failed to decode
    #[error("Invalid log id: {0}")]
    InvalidLogId(String),

    /// The declared key details are outside the supported set
    #[error("Unsupported key details: {0}")]
    UnsupportedKeyDetails(String),

    /// No key registered under the requested hint
    #[error("No trusted key for hint: {0}")]
    KeyNotFound(String),
}

/// Result type for trust material operations
pub type Result<T> = std::result::Result<T, Error>;
