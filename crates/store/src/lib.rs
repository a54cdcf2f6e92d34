//! Durable storage for VeriDB entries.
//!
//! Two layers:
//! - [`log`]: append-only frame logs ([`MemoryLog`], [`FileLog`]) behind the
//!   [`EntryLog`] trait
//! - [`LedgerStore`]: the decoded entry vector plus a key index, replayed
//!   from the log on open
//!
//! The store knows nothing about hashing or proofs; it guarantees dense
//! indices, durable-before-visible appends, and faithful replay.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod log;
mod store;

pub use error::StoreError;
pub use log::{EntryLog, FileLog, MemoryLog};
pub use store::LedgerStore;
