//! Indexed entry store layered over a durable log.

use std::collections::HashMap;

use tracing::{debug, trace};
use veridb_types::{Entry, LedgerError, Result, codec};

use crate::log::EntryLog;

/// Append-only entry store with a key index.
///
/// Entries live in a dense vector addressed by their index; `by_key` maps
/// each key to every index it was ever written at, in write order, so the
/// latest value and the full history are both O(1) lookups away. All
/// durability goes through the wrapped [`EntryLog`]: an append is written
/// (and optionally synced) to the log before it becomes visible in memory.
#[derive(Debug)]
pub struct LedgerStore {
    log: Box<dyn EntryLog>,
    entries: Vec<Entry>,
    by_key: HashMap<Vec<u8>, Vec<u64>>,
}

impl LedgerStore {
    /// Opens a store over `log`, replaying any existing frames.
    ///
    /// Replay decodes each frame as an [`Entry`] and rebuilds the key index.
    /// Indices must be dense from 0; a gap or reorder means the log was
    /// damaged.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Corruption`] if a frame fails to decode or
    /// entry indices are not contiguous, or the log's own errors mapped
    /// through [`LedgerError`].
    pub fn open(log: Box<dyn EntryLog>) -> Result<Self> {
        let frames = log.frames()?;
        let mut store = Self { log, entries: Vec::with_capacity(frames.len()), by_key: HashMap::new() };
        for (position, frame) in frames.iter().enumerate() {
            let entry: Entry = codec::decode(frame).map_err(|err| LedgerError::Corruption {
                reason: format!("frame {position} does not decode as an entry: {err}"),
            })?;
            if entry.index != position as u64 {
                return Err(LedgerError::Corruption {
                    reason: format!(
                        "frame {position} carries entry index {}, expected {position}",
                        entry.index
                    ),
                });
            }
            store.commit(entry);
        }
        debug!(entries = store.entries.len(), "entry store opened");
        Ok(store)
    }

    /// Number of stored entries. The next entry gets this index.
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends `entry` durably, then commits it to the in-memory index.
    ///
    /// When `sync` is set the log is flushed to stable storage before the
    /// entry becomes visible. If the durable write fails nothing is
    /// committed and the store is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Sequence`] if `entry.index` is not the next
    /// contiguous index, or the log's errors mapped through
    /// [`LedgerError`].
    pub fn append(&mut self, entry: Entry, sync: bool) -> Result<()> {
        let expected = self.next_index();
        if entry.index != expected {
            return Err(LedgerError::Sequence { expected, got: entry.index });
        }
        let frame = codec::encode(&entry)?;
        self.log.append_frame(&frame)?;
        if sync {
            self.log.sync()?;
        }
        trace!(index = entry.index, key_len = entry.key.len(), "entry appended");
        self.commit(entry);
        Ok(())
    }

    /// The most recent entry written for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&Entry> {
        let index = *self.by_key.get(key)?.last()?;
        self.entries.get(index as usize)
    }

    /// The entry at `index`, if one exists.
    #[must_use]
    pub fn get_at(&self, index: u64) -> Option<&Entry> {
        self.entries.get(usize::try_from(index).ok()?)
    }

    /// Every entry ever written for `key`, oldest first.
    #[must_use]
    pub fn history(&self, key: &[u8]) -> Vec<&Entry> {
        self.by_key
            .get(key)
            .map(|indices| {
                indices.iter().filter_map(|&i| self.entries.get(i as usize)).collect()
            })
            .unwrap_or_default()
    }

    /// All entries in append order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn commit(&mut self, entry: Entry) {
        self.by_key.entry(entry.key.clone()).or_default().push(entry.index);
        self.entries.push(entry);
    }
}
