//! Append-only Merkle accumulator for VeriDB.
//!
//! The accumulator maintains a versioned authenticated structure over the
//! ledger's leaf digests: every append publishes a new root, all historical
//! roots are retained, and inclusion/consistency proofs can be built against
//! any of them in O(log n).
//!
//! Two halves:
//! - [`Accumulator`] constructs proofs from an explicit forest arena
//! - [`verify`] checks proofs as pure functions over proof data, independent
//!   of any storage
//!
//! The tree shape follows the history-tree construction from RFC 6962: the
//! left subtree at every level covers the largest power of two strictly
//! below the range size. This tie-break rule is fixed so proofs are
//! reproducible bit-for-bit.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod forest;
pub mod verify;

pub use forest::Accumulator;
