//! RFC 6962 hashing
//!
//! Leaf hashes are prefixed with 0x00 and interior node hashes with 0x01
//! so a leaf can never be confused with a node.

use aws_lc_rs::digest::{self, SHA256};

/// Prefix byte for leaf hashes
pub const LEAF_HASH_PREFIX: u8 = 0x00;

/// Prefix byte for interior node hashes
pub const NODE_HASH_PREFIX: u8 = 0x01;

/// Hash size in bytes (SHA-256)
pub const HASH_SIZE: usize = 32;

/// Hash a leaf: SHA256(0x00 || data)
pub fn hash_leaf(data: &[u8]) -> [u8; HASH_SIZE] {
    let mut input = Vec::with_capacity(1 + data.len());
    input.push(LEAF_HASH_PREFIX);
    input.extend_from_slice(data);
    let d = digest::digest(&SHA256, &input);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(d.as_ref());
    out
}

/// Hash two children into a parent: SHA256(0x01 || left || right)
pub fn hash_children(left: &[u8; HASH_SIZE], right: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
    let mut input = Vec::with_capacity(1 + 2 * HASH_SIZE);
    input.push(NODE_HASH_PREFIX);
    input.extend_from_slice(left);
    input.extend_from_slice(right);
    let d = digest::digest(&SHA256, &input);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(d.as_ref());
    out
}
