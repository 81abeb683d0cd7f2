//! Error types for sigil-merkle

use thiserror::Error;

/// Errors that can occur during proof verification
#[derive(Error, Debug)]
pub enum Error {
    /// Tree size is zero or inconsistent with the proof
    #[error("Invalid tree size: {0}")]
    InvalidTreeSize(String),

    /// Leaf index is outside the tree
    #[error("Invalid leaf index: {0}")]
    InvalidLeafIndex(String),

    /// Proof is structurally invalid
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// Recomputed root does not match the expected root
    #[error("Root hash mismatch: expected {expected}, computed {computed}")]
    RootMismatch { expected: String, computed: String },
}

/// Result type for proof verification
pub type Result<T> = std::result::Result<T, Error>;
