//! Verification error taxonomy
//!
//! Verification is all-or-nothing: the first failure short-circuits, and
//! every internal parse failure is re-raised under the category of the
//! check that was running.

use thiserror::Error;

/// The reason a bundle failed verification
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Artifact or DSSE signature failed, or the artifact/digest mismatch
    #[error("signature verification failed: {0}")]
    Signature(String),

    /// Chain, validity window, EKU, SCT count, or certificate parse failure
    #[error("certificate verification failed: {0}")]
    Certificate(String),

    /// No key for the hint, or the key was not valid at the check time
    #[error("public key verification failed: {0}")]
    PublicKey(String),

    /// Canonicalized log entry body disagrees with the bundle
    #[error("transparency log body mismatch: {0}")]
    TlogBody(String),

    /// Signed Entry Timestamp invalid
    #[error("inclusion promise verification failed: {0}")]
    InclusionPromise(String),

    /// Merkle root mismatch or malformed/unsigned checkpoint
    #[error("inclusion proof verification failed: {0}")]
    InclusionProof(String),

    /// Witness thresholds unmet, duplicate entries, or RFC 3161 failure
    #[error("timestamp verification failed: {0}")]
    Timestamp(String),

    /// Certificate identity does not satisfy the caller's policy
    #[error("untrusted signer: {0}")]
    UntrustedSigner(String),
}

impl VerifyError {
    /// Stable error code for this category
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::Signature(_) => "SIGNATURE_ERROR",
            VerifyError::Certificate(_) => "CERTIFICATE_ERROR",
            VerifyError::PublicKey(_) => "PUBLIC_KEY_ERROR",
            VerifyError::TlogBody(_) => "TLOG_BODY_ERROR",
            VerifyError::InclusionPromise(_) => "TLOG_INCLUSION_PROMISE_ERROR",
            VerifyError::InclusionProof(_) => "TLOG_INCLUSION_PROOF_ERROR",
            VerifyError::Timestamp(_) => "TIMESTAMP_ERROR",
            VerifyError::UntrustedSigner(_) => "UNTRUSTED_SIGNER_ERROR",
        }
    }
}

/// Result type for verification
pub type Result<T> = std::result::Result<T, VerifyError>;
