//! Error types for VeriDB using snafu.
//!
//! Defines a unified error type that captures:
//! - Storage errors (durable log I/O, corruption, serialization)
//! - Accumulator errors (out-of-order appends, out-of-range indices)
//! - Proof errors (structurally malformed proofs, failed self-verification)
//! - Application errors (missing keys/indices, bad arguments)
//!
//! Each variant maps to an [`ErrorCode`] with a unique numeric identifier
//! and a retryability classification.

use core::fmt;

use snafu::Snafu;

/// Unified result type for ledger operations.
pub type Result<T, E = LedgerError> = std::result::Result<T, E>;

/// Machine-readable error codes for programmatic error handling.
///
/// Codes are organized into ranges:
///
/// | Range       | Domain       | Examples                                  |
/// |-------------|--------------|-------------------------------------------|
/// | 1000–1099   | Storage      | I/O failure, corruption, serialization     |
/// | 2000–2099   | Accumulator  | Sequence violation, range, proof shape     |
/// | 3000–3099   | Application  | Not-found, invalid argument, config        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // --- Storage errors (1000–1099) ---
    /// Durable append or read failed at the I/O layer.
    StorageIo = 1000,
    /// Durable log corruption detected (torn frame, bad length).
    StorageCorruption = 1001,
    /// Entry or proof serialization failed.
    StorageSerialization = 1002,
    /// Storage-layer failure that is not plain I/O.
    StorageOther = 1003,

    // --- Accumulator errors (2000–2099) ---
    /// Append called with a non-contiguous leaf index.
    AccumulatorSequence = 2000,
    /// Requested index is outside the known history.
    AccumulatorRange = 2001,
    /// Proof is structurally invalid (wrong arity, out-of-range indices).
    ProofMalformed = 2002,
    /// A locally built proof failed its own verification.
    ProofVerificationFailed = 2003,

    // --- Application errors (3000–3099) ---
    /// No entry exists for the requested key.
    KeyNotFound = 3000,
    /// No entry exists at the requested index.
    IndexNotFound = 3001,
    /// Invalid request argument.
    InvalidArgument = 3002,
    /// Configuration error.
    Config = 3003,
    /// Internal error (unexpected state, invariant violation).
    Internal = 3004,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a numeric code to an `ErrorCode`, returning `None` for
    /// unknown values.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1000 => Some(Self::StorageIo),
            1001 => Some(Self::StorageCorruption),
            1002 => Some(Self::StorageSerialization),
            1003 => Some(Self::StorageOther),
            2000 => Some(Self::AccumulatorSequence),
            2001 => Some(Self::AccumulatorRange),
            2002 => Some(Self::ProofMalformed),
            2003 => Some(Self::ProofVerificationFailed),
            3000 => Some(Self::KeyNotFound),
            3001 => Some(Self::IndexNotFound),
            3002 => Some(Self::InvalidArgument),
            3003 => Some(Self::Config),
            3004 => Some(Self::Internal),
            _ => None,
        }
    }

    /// Whether this error is retryable.
    ///
    /// Only transient I/O pressure qualifies; everything else requires the
    /// caller to change something (the request, the configuration, or the
    /// code) before a retry can succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::StorageIo)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Top-level error type for ledger operations.
///
/// Propagation policy: storage and accumulator errors are never swallowed.
/// Every public operation either returns a fully valid result or one of
/// these variants; no partial mutation is ever observable.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LedgerError {
    /// Append called out of order. Fatal: indicates a caller bug, since the
    /// write path assigns indices itself.
    #[snafu(display("Out-of-order append: expected leaf index {expected}, got {got}"))]
    Sequence {
        /// The next valid leaf index.
        expected: u64,
        /// The index that was supplied.
        got: u64,
    },

    /// Index outside the known history. Recoverable: retry with a valid
    /// range.
    #[snafu(display("Index out of range: {message}"))]
    Range {
        /// What was out of range and against which bound.
        message: String,
    },

    /// No entry exists for the key. Recoverable; expected for first reads.
    #[snafu(display("Key not found: {key}"))]
    KeyNotFound {
        /// Lossy-printable form of the key.
        key: String,
    },

    /// No entry exists at the index. Recoverable.
    #[snafu(display("No entry at index {index}"))]
    IndexNotFound {
        /// The missing index.
        index: u64,
    },

    /// Proof is structurally invalid (wrong arity, out-of-range indices).
    ///
    /// Fatal to the verification call. Never downgraded to a `false`
    /// verification result, so callers can distinguish "structurally
    /// invalid" from "cryptographically false".
    #[snafu(display("Malformed proof: {reason}"))]
    MalformedProof {
        /// Which structural check failed.
        reason: String,
    },

    /// The write path's own inclusion proof failed to verify.
    ///
    /// The entry is rolled back before this surfaces; a write is never
    /// reported as "inserted but unverified".
    #[snafu(display("Self-verification failed for entry {index}"))]
    VerificationFailed {
        /// Index of the entry that failed verification.
        index: u64,
    },

    /// I/O error from the durable log. The write is not committed.
    #[snafu(display("I/O error: {source}"))]
    Io {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Storage-layer failure that is not plain I/O.
    #[snafu(display("Storage error: {message}"))]
    Storage {
        /// Error description.
        message: String,
    },

    /// Durable log corruption detected (torn frame, bad length prefix).
    #[snafu(display("Corrupted ledger log: {reason}"))]
    Corruption {
        /// Description of what was corrupted.
        reason: String,
    },

    /// Serialization or deserialization error (postcard codec failure).
    #[snafu(display("Serialization error: {message}"))]
    Serialization {
        /// Error description.
        message: String,
    },

    /// Invalid argument (empty key, oversized key or value).
    #[snafu(display("Invalid argument: {message}"))]
    InvalidArgument {
        /// Error description.
        message: String,
    },

    /// Configuration error (invalid value or constraint violation).
    #[snafu(display("Configuration error: {message}"))]
    Config {
        /// Error description.
        message: String,
    },

    /// Internal error (unexpected state, invariant violation).
    #[snafu(display("Internal error: {message}"))]
    Internal {
        /// Error description.
        message: String,
    },
}

impl LedgerError {
    /// Returns the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Sequence { .. } => ErrorCode::AccumulatorSequence,
            Self::Range { .. } => ErrorCode::AccumulatorRange,
            Self::KeyNotFound { .. } => ErrorCode::KeyNotFound,
            Self::IndexNotFound { .. } => ErrorCode::IndexNotFound,
            Self::MalformedProof { .. } => ErrorCode::ProofMalformed,
            Self::VerificationFailed { .. } => ErrorCode::ProofVerificationFailed,
            Self::Io { .. } => ErrorCode::StorageIo,
            Self::Storage { .. } => ErrorCode::StorageOther,
            Self::Corruption { .. } => ErrorCode::StorageCorruption,
            Self::Serialization { .. } => ErrorCode::StorageSerialization,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::Config { .. } => ErrorCode::Config,
            Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Whether this error is retryable. Delegates to
    /// [`ErrorCode::is_retryable`].
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Builds a [`LedgerError::KeyNotFound`] from raw key bytes.
    #[must_use]
    pub fn key_not_found(key: &[u8]) -> Self {
        Self::KeyNotFound { key: String::from_utf8_lossy(key).into_owned() }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(source: std::io::Error) -> Self {
        LedgerError::Io { source }
    }
}

impl From<crate::codec::CodecError> for LedgerError {
    fn from(err: crate::codec::CodecError) -> Self {
        LedgerError::Serialization { message: err.to_string() }
    }
}
