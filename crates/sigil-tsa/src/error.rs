//! Error types for sigil-tsa

use thiserror::Error;

/// Errors that can occur verifying RFC 3161 timestamps
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to parse the timestamp response or token
    #[error("Failed to parse timestamp response: {0}")]
    ParseError(String),

    /// Response status is not granted
    #[error("Timestamp request not granted: status {0}")]
    NotGranted(u8),

    /// No TSTInfo in the timestamp token
    #[error("No TSTInfo in timestamp token")]
    NoTstInfo,

    /// Message imprint does not match the timestamped data
    #[error("Message imprint mismatch: expected {expected}, got {actual}")]
    ImprintMismatch { expected: String, actual: String },

    /// A required signed attribute is missing or wrong
    #[error("Signed attribute error: {0}")]
    SignedAttribute(String),

    /// CMS signature verification failed
    #[error("Failed to verify timestamp signature: {0}")]
    SignatureVerification(String),

    /// Timestamp falls outside the authority's validity window
    #[error("Timestamp is outside the TSA validity period")]
    OutsideValidityPeriod,

    /// Signer chain does not reach a trusted TSA
    #[error("TSA certificate validation failed: {0}")]
    CertificateValidation(String),
}

/// Result type for TSA operations
pub type Result<T> = std::result::Result<T, Error>;
