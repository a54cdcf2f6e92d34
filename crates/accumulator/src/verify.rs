//! Pure proof verification.
//!
//! These functions are the trust boundary: they recompute roots from
//! untrusted proof material and compare against trusted root digests. They
//! hold no state and never touch storage, so a client with only a pinned
//! root can run them.
//!
//! Structurally broken proofs (wrong sibling count for the claimed tree
//! shape, indices that contradict each other) are reported as
//! [`LedgerError::MalformedProof`] rather than a plain `false`: a `false`
//! means the hashes genuinely did not match, never that the input was
//! garbage.

use veridb_types::{
    Hash, LedgerError, Result,
    hash_eq, node_hash,
    proof::{ConsistencyProof, InclusionProof},
};

/// Checks that `leaf` is committed at `proof.leaf_index` by `expected_root`.
///
/// Walks from the leaf to the root, deciding left/right at each level from
/// the leaf index and the tree size (RFC 9162 §2.1.3.2). Runs through every
/// sibling regardless of intermediate mismatches and compares the final
/// digest in constant time.
///
/// # Errors
///
/// Returns [`LedgerError::MalformedProof`] when the proof's shape is
/// inconsistent with its claimed indices.
pub fn verify_inclusion(
    leaf: &Hash,
    proof: &InclusionProof,
    expected_root: &Hash,
) -> Result<bool> {
    let tree_size = proof.tree_size();
    if proof.leaf_index >= tree_size {
        return Err(LedgerError::MalformedProof {
            reason: format!(
                "leaf index {} outside tree of size {tree_size}",
                proof.leaf_index
            ),
        });
    }

    let mut fn_ = proof.leaf_index;
    let mut sn = tree_size - 1;
    let mut digest = *leaf;
    for sibling in &proof.siblings {
        if sn == 0 {
            return Err(LedgerError::MalformedProof {
                reason: "too many siblings for claimed tree size".to_string(),
            });
        }
        if fn_ & 1 == 1 || fn_ == sn {
            digest = node_hash(sibling, &digest);
            if fn_ & 1 == 0 {
                // Right edge of the tree: skip levels where our subtree has
                // no right sibling.
                while fn_ != 0 && fn_ & 1 == 0 {
                    fn_ >>= 1;
                    sn >>= 1;
                }
            }
        } else {
            digest = node_hash(&digest, sibling);
        }
        fn_ >>= 1;
        sn >>= 1;
    }
    if sn != 0 {
        return Err(LedgerError::MalformedProof {
            reason: "too few siblings for claimed tree size".to_string(),
        });
    }

    Ok(hash_eq(&digest, expected_root))
}

/// Checks that the ledger at `proof.to_root_index` is an append-only
/// extension of the ledger at `proof.from_root_index`.
///
/// Reconstructs both roots from the proof hashes (RFC 9162 §2.1.4.2) and
/// compares each against its trusted digest in constant time.
///
/// # Errors
///
/// Returns [`LedgerError::MalformedProof`] when the indices are inverted or
/// the hash count contradicts the claimed sizes.
pub fn verify_consistency(
    proof: &ConsistencyProof,
    from_root: &Hash,
    to_root: &Hash,
) -> Result<bool> {
    if proof.from_root_index > proof.to_root_index {
        return Err(LedgerError::MalformedProof {
            reason: format!(
                "from index {} past to index {}",
                proof.from_root_index, proof.to_root_index
            ),
        });
    }
    let from_size = proof.from_size();
    let to_size = proof.to_size();

    if from_size == to_size {
        if !proof.hashes.is_empty() {
            return Err(LedgerError::MalformedProof {
                reason: "identical roots need no proof hashes".to_string(),
            });
        }
        return Ok(hash_eq(from_root, to_root));
    }
    if proof.hashes.is_empty() {
        return Err(LedgerError::MalformedProof {
            reason: "empty proof for differing tree sizes".to_string(),
        });
    }

    // When the old size is a power of two its root is a complete subtree of
    // the new tree and the verifier already holds it; otherwise the proof
    // supplies the shared starting node.
    let (mut from_digest, mut to_digest, rest) = if from_size.is_power_of_two() {
        (*from_root, *from_root, &proof.hashes[..])
    } else {
        (proof.hashes[0], proof.hashes[0], &proof.hashes[1..])
    };

    let mut fn_ = from_size - 1;
    let mut sn = to_size - 1;
    while fn_ & 1 == 1 {
        fn_ >>= 1;
        sn >>= 1;
    }

    for hash in rest {
        if sn == 0 {
            return Err(LedgerError::MalformedProof {
                reason: "too many hashes for claimed tree sizes".to_string(),
            });
        }
        if fn_ & 1 == 1 || fn_ == sn {
            from_digest = node_hash(hash, &from_digest);
            to_digest = node_hash(hash, &to_digest);
            if fn_ & 1 == 0 {
                while fn_ != 0 && fn_ & 1 == 0 {
                    fn_ >>= 1;
                    sn >>= 1;
                }
            }
        } else {
            to_digest = node_hash(&to_digest, hash);
        }
        fn_ >>= 1;
        sn >>= 1;
    }
    if sn != 0 {
        return Err(LedgerError::MalformedProof {
            reason: "too few hashes for claimed tree sizes".to_string(),
        });
    }

    Ok(hash_eq(&from_digest, from_root) && hash_eq(&to_digest, to_root))
}
