//! Hash algorithm identifiers

use serde::{Deserialize, Serialize};

/// Supported hash algorithms.
///
/// The protobuf wire form uses `SHA2_256`-style names; transparency log
/// entry bodies use lowercase `sha256`-style names. Both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA2-256
    #[serde(rename = "SHA2_256", alias = "sha256")]
    Sha2_256,
    /// SHA2-384
    #[serde(rename = "SHA2_384", alias = "sha384")]
    Sha2_384,
    /// SHA2-512
    #[serde(rename = "SHA2_512", alias = "sha512")]
    Sha2_512,
}

impl HashAlgorithm {
    /// Digest size in bytes
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha2_256 => 32,
            HashAlgorithm::Sha2_384 => 48,
            HashAlgorithm::Sha2_512 => 64,
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::Sha2_256 => write!(f, "SHA2_256"),
            HashAlgorithm::Sha2_384 => write!(f, "SHA2_384"),
            HashAlgorithm::Sha2_512 => write!(f, "SHA2_512"),
        }
    }
}
