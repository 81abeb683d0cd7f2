//! RFC 6962 Merkle tree verification
//!
//! Leaf and node hashing with domain separation, and inclusion proof
//! verification against a log root hash.

pub mod error;
pub mod proof;
pub mod tree;

pub use error::{Error, Result};
pub use proof::{verify_inclusion_proof, MAX_PROOF_HASHES};
pub use tree::{hash_children, hash_leaf, HASH_SIZE, LEAF_HASH_PREFIX, NODE_HASH_PREFIX};
