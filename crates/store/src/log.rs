//! Durable append-only frame logs.
//!
//! The store persists entries as opaque frames through the [`EntryLog`]
//! trait so the ledger can run fully in memory or against a file with the
//! same code path. Frames are written once and never rewritten.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use parking_lot::{Mutex, RwLock};

use crate::error::StoreError;

/// Backing storage for the entry log.
///
/// Implementations only deal in opaque byte frames; framing on disk and
/// entry encoding are separate layers.
pub trait EntryLog: Send + Sync + std::fmt::Debug {
    /// Appends one frame to the log.
    fn append_frame(&self, frame: &[u8]) -> Result<(), StoreError>;

    /// Forces previously appended frames to durable storage.
    fn sync(&self) -> Result<(), StoreError>;

    /// Reads back every frame in append order.
    fn frames(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}

/// Volatile in-memory log. Durability is a no-op; everything else behaves
/// like the file-backed log.
#[derive(Debug, Default)]
pub struct MemoryLog {
    frames: RwLock<Vec<Vec<u8>>>,
}

impl MemoryLog {
    /// Creates an empty in-memory log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryLog for MemoryLog {
    fn append_frame(&self, frame: &[u8]) -> Result<(), StoreError> {
        self.frames.write().push(frame.to_vec());
        Ok(())
    }

    fn sync(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn frames(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.frames.read().clone())
    }
}

/// File-backed log: length-prefixed frames, appended sequentially.
///
/// Each frame is a little-endian `u32` byte length followed by the payload.
/// A tail that ends mid-frame is reported as corruption rather than silently
/// dropped, since a verifiable log must not lose acknowledged writes.
#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLog {
    /// Opens (creating if absent) the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).read(true).append(true).open(&path)?;
        Ok(Self { path, file: Mutex::new(file) })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntryLog for FileLog {
    fn append_frame(&self, frame: &[u8]) -> Result<(), StoreError> {
        let len = u32::try_from(frame.len()).map_err(|_| StoreError::Corrupted {
            reason: format!("frame of {} bytes exceeds the u32 length prefix", frame.len()),
        })?;
        let mut file = self.file.lock();
        file.write_all(&len.to_le_bytes())?;
        file.write_all(frame)?;
        Ok(())
    }

    fn sync(&self) -> Result<(), StoreError> {
        self.file.lock().sync_data()?;
        Ok(())
    }

    fn frames(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        // Fresh read handle so the shared append handle keeps its position.
        let mut reader = File::open(&self.path)?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let mut frames = Vec::new();
        let mut pos = 0usize;
        while pos < bytes.len() {
            let Some(header) = bytes.get(pos..pos + 4) else {
                return Err(StoreError::Corrupted {
                    reason: format!("truncated frame header at byte {pos}"),
                });
            };
            let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            pos += 4;
            let Some(payload) = bytes.get(pos..pos + len) else {
                return Err(StoreError::Corrupted {
                    reason: format!("frame at byte {} overflows the file", pos - 4),
                });
            };
            frames.push(payload.to_vec());
            pos += len;
        }
        Ok(frames)
    }
}
