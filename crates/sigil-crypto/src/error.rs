//! Error types for sigil-crypto

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Error, Debug)]
pub enum Error {
    /// Signature did not verify
    #[error("Verification error: {0}")]
    Verification(String),

    /// Malformed or unusable key material
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Certificate parsing or decoding failure
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Algorithm outside the supported set
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Base64 error
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;
