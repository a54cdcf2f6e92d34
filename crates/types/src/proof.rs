//! Inclusion and consistency proof types.
//!
//! Proofs are plain ordered sequences of digests plus indices, so
//! verification is a pure function over data and does not depend on any
//! particular storage backend. Both types serialize with serde for callers
//! that ship proofs across a transport layer.

use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// Proof that a leaf is included in the accumulator at a given root.
///
/// `siblings` holds the sibling hashes on the path from the leaf to the
/// root, ordered leaf-first. The path layout follows the fixed tie-break
/// rule documented on the accumulator: at every level the left subtree
/// covers the largest power of two strictly below the range size, so the
/// proof for a `(leaf_index, root_index)` pair is reproducible bit-for-bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Index of the proven leaf.
    pub leaf_index: u64,
    /// Index of the root the proof targets (tree size minus one).
    pub root_index: u64,
    /// Sibling hashes from leaf level up to the root.
    pub siblings: Vec<Hash>,
}

impl InclusionProof {
    /// Number of leaves in the tree this proof targets.
    #[must_use]
    pub const fn tree_size(&self) -> u64 {
        self.root_index + 1
    }
}

/// Proof that the accumulator at `to_root_index` is a strict append-only
/// extension of the accumulator at `from_root_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProof {
    /// Root index of the older tree.
    pub from_root_index: u64,
    /// Root index of the newer tree.
    pub to_root_index: u64,
    /// Hash sequence sufficient to recompute both roots.
    pub hashes: Vec<Hash>,
}

impl ConsistencyProof {
    /// Number of leaves in the older tree.
    #[must_use]
    pub const fn from_size(&self) -> u64 {
        self.from_root_index + 1
    }

    /// Number of leaves in the newer tree.
    #[must_use]
    pub const fn to_size(&self) -> u64 {
        self.to_root_index + 1
    }
}
