//! Hashing utilities using aws-lc-rs

use aws_lc_rs::digest::{self, SHA256, SHA384, SHA512};
use sigil_types::HashAlgorithm;

/// Hash data using SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = digest::digest(&SHA256, data);
    let mut result = [0u8; 32];
    result.copy_from_slice(digest.as_ref());
    result
}

/// Hash data using SHA-384
pub fn sha384(data: &[u8]) -> [u8; 48] {
    let digest = digest::digest(&SHA384, data);
    let mut result = [0u8; 48];
    result.copy_from_slice(digest.as_ref());
    result
}

/// Hash data using SHA-512
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let digest = digest::digest(&SHA512, data);
    let mut result = [0u8; 64];
    result.copy_from_slice(digest.as_ref());
    result
}

/// Hash data with a runtime-selected algorithm
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha2_256 => sha256(data).to_vec(),
        HashAlgorithm::Sha2_384 => sha384(data).to_vec(),
        HashAlgorithm::Sha2_512 => sha512(data).to_vec(),
    }
}

/// Constant-time byte comparison.
///
/// Slices of different lengths compare unequal without a timing-dependent
/// scan of the contents.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    aws_lc_rs::constant_time::verify_slices_are_equal(a, b).is_ok()
}
