//! Storage-layer errors.

use snafu::Snafu;
use veridb_types::{LedgerError, codec::CodecError};

/// Errors produced by the durable entry log.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    /// An underlying I/O operation failed.
    #[snafu(display("I/O error: {source}"))]
    Io {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The log's on-disk contents are inconsistent.
    #[snafu(display("Log corrupted: {reason}"))]
    Corrupted {
        /// What was found to be inconsistent.
        reason: String,
    },

    /// A log frame failed to encode or decode.
    #[snafu(display("Codec error: {source}"))]
    Codec {
        /// The underlying codec error.
        source: CodecError,
    },
}

impl From<std::io::Error> for StoreError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}

impl From<CodecError> for StoreError {
    fn from(source: CodecError) -> Self {
        Self::Codec { source }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io { source } => Self::Io { source },
            StoreError::Corrupted { reason } => Self::Corruption { reason },
            StoreError::Codec { source } => Self::Serialization { message: source.to_string() },
        }
    }
}
