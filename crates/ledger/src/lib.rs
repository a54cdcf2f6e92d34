//! VeriDB: a verifiable key-value ledger.
//!
//! Every write is appended to a durable log and folded into a Merkle
//! accumulator; every read comes back with a cryptographic proof check
//! against the current root. The ledger verifies its own proofs on both
//! paths, so a write is never acknowledged (and a read never answered)
//! without the authenticated structure agreeing with the data.
//!
//! # Example
//!
//! ```no_run
//! # use veridb_ledger::{Ledger, LedgerConfig};
//! # fn main() -> veridb_types::Result<()> {
//! let ledger = Ledger::with_config(LedgerConfig::default())?;
//! let receipt = ledger.write(b"greeting", b"hello")?;
//! assert!(receipt.verified);
//!
//! let result = ledger.read(b"greeting")?;
//! assert_eq!(result.value, b"hello");
//! assert!(result.verified);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;

use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use veridb_accumulator::verify::{verify_consistency, verify_inclusion};
use veridb_store::{FileLog, LedgerStore, MemoryLog};
use veridb_types::{leaf_hash, now_millis};

pub use config::LedgerConfig;
pub use veridb_accumulator::{Accumulator, verify};
pub use veridb_types::{
    ConsistencyProof, Entry, ErrorCode, Hash, InclusionProof, LedgerError, Result, RootInfo,
};

/// Acknowledgement of a verified write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// Index assigned to the written entry.
    pub index: u64,
    /// Root version published by this write (equals `index`).
    pub root_index: u64,
    /// Milliseconds since the Unix epoch recorded in the entry.
    pub timestamp: u64,
    /// The write passed inclusion verification before being acknowledged.
    pub verified: bool,
}

/// A value read back together with its verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    /// The stored value.
    pub value: Vec<u8>,
    /// Index of the entry that produced this value.
    pub index: u64,
    /// Milliseconds since the Unix epoch recorded at write time.
    pub timestamp: u64,
    /// Inclusion (and, for older entries, consistency) verification passed.
    pub verified: bool,
}

/// State mutated under the write lock: the entry store and the accumulator
/// never disagree outside of a single `write` call.
#[derive(Debug)]
struct LedgerInner {
    store: LedgerStore,
    accumulator: Accumulator,
}

/// The verifiable key-value ledger.
///
/// Thread-safe: reads take a shared lock, writes an exclusive one. A write
/// becomes visible only after the entry is durable and its inclusion proof
/// has been checked against the new root; any failure rolls the accumulator
/// back so readers never observe a half-applied write.
#[derive(Debug)]
pub struct Ledger {
    inner: RwLock<LedgerInner>,
    config: LedgerConfig,
}

impl Ledger {
    /// Creates a volatile in-memory ledger with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if the default configuration fails
    /// validation (it does not; the fallible signature matches the other
    /// constructors).
    pub fn in_memory() -> Result<Self> {
        Self::with_config(LedgerConfig::default())
    }

    /// Creates a volatile in-memory ledger with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if `config` fails validation.
    pub fn with_config(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let store = LedgerStore::open(Box::new(MemoryLog::new()))?;
        Ok(Self {
            inner: RwLock::new(LedgerInner { store, accumulator: Accumulator::new() }),
            config,
        })
    }

    /// Opens a file-backed ledger, replaying any existing entries.
    ///
    /// Replay rebuilds the accumulator leaf by leaf and cross-checks it
    /// against the store, so a ledger that opens successfully is already
    /// verified end to end.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if `config` fails validation,
    /// [`LedgerError::Corruption`] if the log's contents are inconsistent,
    /// or [`LedgerError::Io`] for underlying file errors.
    pub fn open(path: impl AsRef<Path>, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let log = FileLog::open(path)?;
        let store = LedgerStore::open(Box::new(log))?;

        let mut accumulator = Accumulator::new();
        for entry in store.entries() {
            let leaf = leaf_hash(entry);
            accumulator.append(entry.index, leaf)?;
        }
        debug!(entries = store.len(), "ledger opened");

        Ok(Self { inner: RwLock::new(LedgerInner { store, accumulator }), config })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Number of entries in the ledger.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.read().store.len()
    }

    /// Whether the ledger holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().store.is_empty()
    }

    /// Writes `value` under `key` and verifies the write before
    /// acknowledging it.
    ///
    /// The new entry is hashed into the accumulator, an inclusion proof is
    /// built against the freshly published root and checked, and only then
    /// is the entry made durable and visible. If verification or the
    /// durable append fails the accumulator is rolled back and the ledger
    /// is left exactly as before.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] if the key is empty or either the
    ///   key or value exceeds the configured size limits
    /// - [`LedgerError::VerificationFailed`] if the self-check does not pass
    /// - [`LedgerError::Io`] if the durable append fails
    #[instrument(skip_all, fields(key_len = key.len(), value_len = value.len()))]
    pub fn write(&self, key: &[u8], value: &[u8]) -> Result<WriteReceipt> {
        if key.is_empty() {
            return Err(LedgerError::InvalidArgument { message: "key must not be empty".into() });
        }
        if key.len() > self.config.max_key_size {
            return Err(LedgerError::InvalidArgument {
                message: format!(
                    "key of {} bytes exceeds max_key_size {}",
                    key.len(),
                    self.config.max_key_size
                ),
            });
        }
        if value.len() > self.config.max_value_size {
            return Err(LedgerError::InvalidArgument {
                message: format!(
                    "value of {} bytes exceeds max_value_size {}",
                    value.len(),
                    self.config.max_value_size
                ),
            });
        }

        let mut inner = self.inner.write();
        let index = inner.store.next_index();
        let entry =
            Entry { key: key.to_vec(), value: value.to_vec(), index, timestamp: now_millis() };
        let leaf = leaf_hash(&entry);

        let (root_index, root) = inner.accumulator.append(index, leaf)?;
        let verified = inner
            .accumulator
            .inclusion_proof(index, root_index)
            .and_then(|proof| verify_inclusion(&leaf, &proof, &root));
        match verified {
            Ok(true) => {}
            Ok(false) => {
                inner.accumulator.revert_last_append();
                warn!(index, "write self-verification failed");
                return Err(LedgerError::VerificationFailed { index });
            }
            Err(err) => {
                inner.accumulator.revert_last_append();
                return Err(err);
            }
        }

        let timestamp = entry.timestamp;
        if let Err(err) = inner.store.append(entry, self.config.sync_on_append) {
            inner.accumulator.revert_last_append();
            warn!(index, error = %err, "durable append failed, write rolled back");
            return Err(err);
        }

        debug!(index, root_index, "write verified and committed");
        Ok(WriteReceipt { index, root_index, timestamp, verified: true })
    }

    /// Reads the latest value for `key`, verifying it against the current
    /// root before returning.
    ///
    /// Verification covers inclusion of the entry under the current root
    /// and, when the entry predates the current root, consistency between
    /// the root published at write time and the current one.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::KeyNotFound`] if no entry exists for `key`
    /// - [`LedgerError::VerificationFailed`] if the stored data and the
    ///   authenticated structure disagree
    #[instrument(skip_all, fields(key_len = key.len()))]
    pub fn read(&self, key: &[u8]) -> Result<ReadResult> {
        let inner = self.inner.read();
        let entry = inner.store.get(key).ok_or_else(|| LedgerError::key_not_found(key))?;
        Self::verified_result(&inner, entry)
    }

    /// Reads the entry at `index`, verifying it against the current root.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::IndexNotFound`] if no entry exists at `index`
    /// - [`LedgerError::VerificationFailed`] if the stored data and the
    ///   authenticated structure disagree
    pub fn read_at(&self, index: u64) -> Result<ReadResult> {
        let inner = self.inner.read();
        let entry = inner.store.get_at(index).ok_or(LedgerError::IndexNotFound { index })?;
        Self::verified_result(&inner, entry)
    }

    /// Every version ever written for `key`, oldest first. Empty when the
    /// key has never been written. Unverified; use [`Ledger::read_at`] on an
    /// individual version to verify it.
    #[must_use]
    pub fn history(&self, key: &[u8]) -> Vec<Entry> {
        self.inner.read().store.history(key).into_iter().cloned().collect()
    }

    /// The entry at `index`, for external proof checking.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IndexNotFound`] if no entry exists at `index`.
    pub fn entry_at(&self, index: u64) -> Result<Entry> {
        self.inner
            .read()
            .store
            .get_at(index)
            .cloned()
            .ok_or(LedgerError::IndexNotFound { index })
    }

    /// The most recently published root, or `None` while empty.
    #[must_use]
    pub fn current_root(&self) -> Option<RootInfo> {
        self.inner.read().accumulator.latest_root()
    }

    /// The historical root published by the append at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IndexNotFound`] if no root has been published
    /// at `index`.
    pub fn root_at(&self, index: u64) -> Result<Hash> {
        self.inner.read().accumulator.root_at(index)
    }

    /// Builds an inclusion proof for the entry at `leaf_index` against the
    /// root published at `root_index`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Range`] if the indices fall outside the
    /// ledger's history.
    pub fn inclusion_proof(&self, leaf_index: u64, root_index: u64) -> Result<InclusionProof> {
        self.inner.read().accumulator.inclusion_proof(leaf_index, root_index)
    }

    /// Builds a consistency proof between the roots published at
    /// `from_index` and `to_index`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Range`] if the indices fall outside the
    /// ledger's history.
    pub fn consistency_proof(&self, from_index: u64, to_index: u64) -> Result<ConsistencyProof> {
        self.inner.read().accumulator.consistency_proof(from_index, to_index)
    }

    /// Verifies `entry` against the current root and wraps it in a
    /// [`ReadResult`]. A mismatch is an error, never a silent
    /// `verified: false`.
    fn verified_result(inner: &LedgerInner, entry: &Entry) -> Result<ReadResult> {
        let root = inner.accumulator.latest_root().ok_or(LedgerError::Internal {
            message: "store holds entries but no root is published".to_string(),
        })?;

        let leaf = leaf_hash(entry);
        let proof = inner.accumulator.inclusion_proof(entry.index, root.index)?;
        let mut verified = verify_inclusion(&leaf, &proof, &root.digest)?;

        if verified && entry.index < root.index {
            let consistency = inner.accumulator.consistency_proof(entry.index, root.index)?;
            let write_root = inner.accumulator.root_at(entry.index)?;
            verified = verify_consistency(&consistency, &write_root, &root.digest)?;
        }

        if !verified {
            warn!(index = entry.index, "read verification failed");
            return Err(LedgerError::VerificationFailed { index: entry.index });
        }

        Ok(ReadResult {
            value: entry.value.clone(),
            index: entry.index,
            timestamp: entry.timestamp,
            verified: true,
        })
    }
}
