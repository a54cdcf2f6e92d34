//! The accumulator itself: an explicit, indexable forest of complete binary
//! subtrees.
//!
//! The arena `levels[h][i]` holds the hash of the complete subtree of height
//! `h` covering leaves `[i * 2^h, (i + 1) * 2^h)`. Nodes are only ever
//! appended: a slot is written once its subtree is complete and is never
//! touched again. The root over `n` leaves is derived by folding the
//! forest's peaks (the complete subtrees given by the binary decomposition
//! of `n`) from rightmost to leftmost, which is exactly the RFC 6962 merkle
//! tree head over the first `n` leaves.
//!
//! Every append also records the resulting root in a versioned table, so
//! historical roots are read back verbatim rather than recomputed.

use veridb_types::{
    EMPTY_HASH, Hash, LedgerError, Result, RootInfo,
    node_hash,
    proof::{ConsistencyProof, InclusionProof},
};

/// Largest power of two strictly less than `n`. Requires `n >= 2`.
pub(crate) fn largest_power_of_two_below(n: usize) -> usize {
    debug_assert!(n >= 2);
    1 << (usize::BITS - 1 - (n - 1).leading_zeros())
}

/// Append-only Merkle accumulator tracking all historical states.
#[derive(Debug, Clone)]
pub struct Accumulator {
    /// Arena of complete-subtree hashes; `levels[h]` has `floor(n / 2^h)`
    /// entries when `n` leaves have been appended.
    levels: Vec<Vec<Hash>>,
    /// Root after each append; `roots[i]` commits to leaves `0..=i`.
    roots: Vec<Hash>,
}

impl Accumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self { levels: vec![Vec::new()], roots: Vec::new() }
    }

    /// Number of leaves appended so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.levels[0].len() as u64
    }

    /// Whether no leaves have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// Appends one leaf digest and publishes the new root.
    ///
    /// `leaf_index` must equal the current leaf count: indices are assigned
    /// contiguously from 0 and the caller passes the index it expects, which
    /// catches lost or duplicated appends at the boundary.
    ///
    /// Returns `(root_index, root)` where `root_index == leaf_index`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Sequence`] if `leaf_index` is not the next
    /// contiguous index.
    pub fn append(&mut self, leaf_index: u64, leaf: Hash) -> Result<(u64, Hash)> {
        let expected = self.len();
        if leaf_index != expected {
            return Err(LedgerError::Sequence { expected, got: leaf_index });
        }

        self.levels[0].push(leaf);

        // Carry upward: each newly completed pair gets exactly one parent.
        let mut h = 0;
        loop {
            let level_len = self.levels[h].len();
            if level_len % 2 != 0 {
                break;
            }
            let parent_count = level_len / 2;
            if self.levels.len() <= h + 1 {
                self.levels.push(Vec::new());
            }
            if self.levels[h + 1].len() == parent_count {
                break;
            }
            let parent = node_hash(&self.levels[h][level_len - 2], &self.levels[h][level_len - 1]);
            self.levels[h + 1].push(parent);
            h += 1;
        }

        let size = self.levels[0].len();
        let root = self.compute_root(size);
        self.roots.push(root);
        Ok(((size - 1) as u64, root))
    }

    /// Removes the most recent append, restoring the previous state.
    ///
    /// Only valid while the new state has not yet been published to readers:
    /// the write path uses this to restore the pre-append state when the
    /// durable append or the self-verification step fails, so no reader ever
    /// observes the reverted leaf.
    pub fn revert_last_append(&mut self) {
        let size = self.levels[0].len();
        if size == 0 {
            return;
        }
        self.roots.pop();
        let mut expected = size - 1;
        for level in &mut self.levels {
            level.truncate(expected);
            expected /= 2;
        }
        while self.levels.len() > 1 && self.levels.last().is_some_and(Vec::is_empty) {
            self.levels.pop();
        }
    }

    /// Returns the historical root published by the append at `index`.
    ///
    /// Roots are stored, not recomputed: repeated calls return the identical
    /// digest.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IndexNotFound`] if no append has happened at
    /// `index` yet.
    pub fn root_at(&self, index: u64) -> Result<Hash> {
        self.roots
            .get(index as usize)
            .copied()
            .ok_or(LedgerError::IndexNotFound { index })
    }

    /// The most recently published root, or `None` while empty.
    #[must_use]
    pub fn latest_root(&self) -> Option<RootInfo> {
        let index = self.roots.len().checked_sub(1)?;
        Some(RootInfo { index: index as u64, digest: self.roots[index] })
    }

    /// Builds an inclusion proof for `leaf_index` against the root published
    /// at `root_index`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Range`] if `leaf_index > root_index` or
    /// `root_index` exceeds the known history.
    pub fn inclusion_proof(&self, leaf_index: u64, root_index: u64) -> Result<InclusionProof> {
        if root_index >= self.len() {
            return Err(LedgerError::Range {
                message: format!(
                    "root index {} exceeds history (latest is {})",
                    root_index,
                    self.len().saturating_sub(1)
                ),
            });
        }
        if leaf_index > root_index {
            return Err(LedgerError::Range {
                message: format!("leaf index {leaf_index} past root index {root_index}"),
            });
        }

        let tree_size = (root_index + 1) as usize;
        let mut siblings = Vec::new();
        self.path(leaf_index as usize, 0, tree_size, &mut siblings);
        Ok(InclusionProof { leaf_index, root_index, siblings })
    }

    /// Builds a consistency proof between the roots published at
    /// `from_index` and `to_index`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Range`] if `from_index > to_index` or
    /// `to_index` exceeds the known history.
    pub fn consistency_proof(&self, from_index: u64, to_index: u64) -> Result<ConsistencyProof> {
        if to_index >= self.len() {
            return Err(LedgerError::Range {
                message: format!(
                    "root index {} exceeds history (latest is {})",
                    to_index,
                    self.len().saturating_sub(1)
                ),
            });
        }
        if from_index > to_index {
            return Err(LedgerError::Range {
                message: format!("from index {from_index} past to index {to_index}"),
            });
        }

        let from_size = (from_index + 1) as usize;
        let to_size = (to_index + 1) as usize;
        let mut hashes = Vec::new();
        self.subproof(from_size, 0, to_size, true, &mut hashes);
        Ok(ConsistencyProof { from_root_index: from_index, to_root_index: to_index, hashes })
    }

    /// Root over the first `size` leaves, via peak folding.
    fn compute_root(&self, size: usize) -> Hash {
        let mut peaks = Vec::new();
        let mut offset = 0usize;
        for h in (0..usize::BITS - size.leading_zeros()).rev() {
            if size & (1usize << h) != 0 {
                peaks.push(self.levels[h as usize][offset >> h]);
                offset += 1usize << h;
            }
        }
        let mut acc: Option<Hash> = None;
        for peak in peaks.iter().rev() {
            acc = Some(match acc {
                None => *peak,
                Some(right) => node_hash(peak, &right),
            });
        }
        acc.unwrap_or(EMPTY_HASH)
    }

    /// Merkle tree head over leaves `[lo, hi)`.
    ///
    /// In the proof recursions every left range is aligned and complete, so
    /// this bottoms out in O(1) arena lookups and the recursion depth stays
    /// logarithmic.
    fn range_root(&self, lo: usize, hi: usize) -> Hash {
        let n = hi - lo;
        debug_assert!(n >= 1);
        if n.is_power_of_two() && lo % n == 0 {
            let h = n.trailing_zeros() as usize;
            return self.levels[h][lo >> h];
        }
        let k = largest_power_of_two_below(n);
        node_hash(&self.range_root(lo, lo + k), &self.range_root(lo + k, hi))
    }

    /// RFC 6962 PATH: sibling hashes for leaf `m` within `[lo, hi)`.
    fn path(&self, m: usize, lo: usize, hi: usize, out: &mut Vec<Hash>) {
        let n = hi - lo;
        if n == 1 {
            return;
        }
        let k = largest_power_of_two_below(n);
        if m < lo + k {
            self.path(m, lo, lo + k, out);
            out.push(self.range_root(lo + k, hi));
        } else {
            self.path(m, lo + k, hi, out);
            out.push(self.range_root(lo, lo + k));
        }
    }

    /// RFC 6962 SUBPROOF: hashes proving the first `m` leaves of `[lo, hi)`
    /// are a prefix. `complete` tracks whether the old tree's root is
    /// derivable by the verifier without help.
    fn subproof(&self, m: usize, lo: usize, hi: usize, complete: bool, out: &mut Vec<Hash>) {
        let n = hi - lo;
        if m == n {
            if !complete {
                out.push(self.range_root(lo, hi));
            }
            return;
        }
        let k = largest_power_of_two_below(n);
        if m <= k {
            self.subproof(m, lo, lo + k, complete, out);
            out.push(self.range_root(lo + k, hi));
        } else {
            self.subproof(m - k, lo + k, hi, false, out);
            out.push(self.range_root(lo, lo + k));
        }
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}
