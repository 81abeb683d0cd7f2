//! Error types for sigil-rekor

use thiserror::Error;

/// Errors that can occur parsing log entry bodies
#[derive(Error, Debug)]
pub enum Error {
    /// Body is not valid JSON for its declared kind/version
    #[error("Invalid entry body: {0}")]
    InvalidBody(String),

    /// Kind/version not in the supported set
    #[error("Unsupported entry kind/version: {kind}/{version}")]
    UnsupportedKind { kind: String, version: String },

    /// Body's declared kind/version disagrees with the entry metadata
    #[error("Entry body declares {body_kind}/{body_version}, entry says {kind}/{version}")]
    KindVersionMismatch {
        kind: String,
        version: String,
        body_kind: String,
        body_version: String,
    },
}

/// Result type for body parsing
pub type Result<T> = std::result::Result<T, Error>;
