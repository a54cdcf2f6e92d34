//! Ledger data structures.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// A single immutable ledger record.
///
/// Entries are owned by the ledger store. The index is assigned at append
/// time, starts at 0, is strictly increasing with no gaps, and is never
/// reused. Once appended an entry never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Key bytes. Multiple entries may share a key; reads resolve to the
    /// entry with the highest index (last-write-wins).
    pub key: Vec<u8>,
    /// Value bytes.
    pub value: Vec<u8>,
    /// Transaction index assigned by the ledger store.
    pub index: u64,
    /// Unix timestamp in milliseconds, recorded at append time.
    pub timestamp: u64,
}

/// A published accumulator root.
///
/// Root `index` is the transaction index of the append that produced it:
/// the root at index `i` commits to all entries with index `<= i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootInfo {
    /// Transaction index this root was published at.
    pub index: u64,
    /// Root digest.
    pub digest: Hash,
}

/// Current unix time in milliseconds.
///
/// Clamped at zero for pre-epoch clocks so the ledger timestamp type can
/// stay unsigned.
#[must_use]
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
