//! Core types, errors, and cryptographic primitives for VeriDB.
//!
//! This crate provides the foundational pieces used throughout the ledger:
//! - Data structures for ledger entries and published roots
//! - Cryptographic hashing functions (SHA-256, domain-separated leaf/node rules)
//! - Inclusion and consistency proof types (plain serializable data)
//! - Error types using snafu

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod hash;
pub mod proof;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ErrorCode, LedgerError, Result};
pub use hash::{EMPTY_HASH, Hash, hash_eq, leaf_hash, node_hash, sha256};
pub use proof::{ConsistencyProof, InclusionProof};
pub use types::{Entry, RootInfo, now_millis};
