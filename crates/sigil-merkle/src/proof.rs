//! Inclusion proof verification
//!
//! Recomputes the root hash from a leaf hash and an audit path, following
//! the RFC 6962 algorithm used by the transparency-dev reference
//! implementations.

use crate::error::{Error, Result};
use crate::tree::{hash_children, HASH_SIZE};

/// Upper bound on audit path length. A tree would need more than 2^64
/// leaves to produce a longer path, so anything above this is hostile
/// input rather than a real proof.
pub const MAX_PROOF_HASHES: usize = 64;

/// Verify an inclusion proof for a leaf.
///
/// * `leaf_hash` - RFC 6962 leaf hash of the entry
/// * `leaf_index` - 0-based index of the leaf
/// * `tree_size` - number of leaves in the tree
/// * `proof_hashes` - sibling hashes, leaf to root
/// * `expected_root` - root hash to check against
pub fn verify_inclusion_proof(
    leaf_hash: &[u8; HASH_SIZE],
    leaf_index: u64,
    tree_size: u64,
    proof_hashes: &[[u8; HASH_SIZE]],
    expected_root: &[u8; HASH_SIZE],
) -> Result<()> {
    if tree_size == 0 {
        return Err(Error::InvalidTreeSize(
            "tree size cannot be zero".to_string(),
        ));
    }

    if leaf_index >= tree_size {
        return Err(Error::InvalidLeafIndex(format!(
            "leaf index {} >= tree size {}",
            leaf_index, tree_size
        )));
    }

    if proof_hashes.len() > MAX_PROOF_HASHES {
        return Err(Error::InvalidProof(format!(
            "audit path of {} hashes exceeds maximum {}",
            proof_hashes.len(),
            MAX_PROOF_HASHES
        )));
    }

    // Fold the audit path into the leaf hash (RFC 9162 §2.1.3.2). A right
    // child (odd index) or the rightmost node of an incomplete level takes
    // its sibling on the left; a left child takes it on the right. After a
    // rightmost-node fold the walk climbs past the levels where the node
    // is its own subtree root.
    let mut hash = *leaf_hash;
    let mut index = leaf_index;
    let mut last_node = tree_size - 1;

    for proof_hash in proof_hashes {
        if last_node == 0 {
            return Err(Error::InvalidProof(
                "audit path longer than tree depth".to_string(),
            ));
        }
        if index % 2 == 1 || index == last_node {
            hash = hash_children(proof_hash, &hash);
            if index % 2 == 0 {
                while index % 2 == 0 && index != 0 {
                    index >>= 1;
                    last_node >>= 1;
                }
            }
        } else {
            hash = hash_children(&hash, proof_hash);
        }
        index >>= 1;
        last_node >>= 1;
    }

    if last_node != 0 {
        return Err(Error::InvalidProof(
            "audit path shorter than tree depth".to_string(),
        ));
    }

    if hash != *expected_root {
        return Err(Error::RootMismatch {
            expected: hex::encode(expected_root),
            computed: hex::encode(hash),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::hash_leaf;

    #[test]
    fn test_single_leaf_tree() {
        // tree_size=1, empty path: root is the leaf hash itself.
        let leaf = hash_leaf(b"");
        assert!(verify_inclusion_proof(&leaf, 0, 1, &[], &leaf).is_ok());
    }

    #[test]
    fn test_two_leaf_tree() {
        let h0 = hash_leaf(b"leaf0");
        let h1 = hash_leaf(b"leaf1");
        let root = hash_children(&h0, &h1);

        assert!(verify_inclusion_proof(&h0, 0, 2, &[h1], &root).is_ok());
        assert!(verify_inclusion_proof(&h1, 1, 2, &[h0], &root).is_ok());
        // Swapped sibling order must fail.
        assert!(verify_inclusion_proof(&h0, 1, 2, &[h1], &root).is_err());
    }

    #[test]
    fn test_five_leaf_tree() {
        // Build the RFC 6962 tree for 5 leaves by hand:
        //        root
        //       /    \
        //      k      h4
        //     / \
        //    i   j
        //   /|   |\
        //  h0 h1 h2 h3
        let leaves: Vec<[u8; 32]> = (0u8..5).map(|i| hash_leaf(&[i])).collect();
        let i = hash_children(&leaves[0], &leaves[1]);
        let j = hash_children(&leaves[2], &leaves[3]);
        let k = hash_children(&i, &j);
        let root = hash_children(&k, &leaves[4]);

        // Leaf 2 is a left child: path is h3, then i, then h4.
        assert!(
            verify_inclusion_proof(&leaves[2], 2, 5, &[leaves[3], i, leaves[4]], &root).is_ok()
        );
        // Leaf 4 is the rightmost node at every level: path is just k.
        assert!(verify_inclusion_proof(&leaves[4], 4, 5, &[k], &root).is_ok());
    }

    #[test]
    fn test_zero_tree_size() {
        let leaf = hash_leaf(b"x");
        assert!(matches!(
            verify_inclusion_proof(&leaf, 0, 0, &[], &leaf),
            Err(Error::InvalidTreeSize(_))
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let leaf = hash_leaf(b"x");
        assert!(matches!(
            verify_inclusion_proof(&leaf, 3, 2, &[], &leaf),
            Err(Error::InvalidLeafIndex(_))
        ));
    }

    #[test]
    fn test_path_length_mismatch() {
        let h0 = hash_leaf(b"leaf0");
        let h1 = hash_leaf(b"leaf1");
        let root = hash_children(&h0, &h1);

        // Too short for the tree.
        assert!(verify_inclusion_proof(&h0, 0, 2, &[], &root).is_err());
        // Too long for the tree.
        assert!(verify_inclusion_proof(&h0, 0, 1, &[h1], &h0).is_err());
    }

    #[test]
    fn test_oversized_path_rejected() {
        let leaf = hash_leaf(b"x");
        let path = vec![[0u8; 32]; MAX_PROOF_HASHES + 1];
        assert!(matches!(
            verify_inclusion_proof(&leaf, 0, u64::MAX, &path, &leaf),
            Err(Error::InvalidProof(_))
        ));
    }

    #[test]
    fn test_root_mismatch() {
        let h0 = hash_leaf(b"leaf0");
        let h1 = hash_leaf(b"leaf1");
        let wrong_root = [0u8; 32];
        assert!(matches!(
            verify_inclusion_proof(&h0, 0, 2, &[h1], &wrong_root),
            Err(Error::RootMismatch { .. })
        ));
    }
}
