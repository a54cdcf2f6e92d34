//! Binary codec for durable log frames and proofs.
//!
//! All persisted data goes through this one postcard entry point so the
//! on-disk encoding has a single definition.

use serde::{Serialize, de::DeserializeOwned};
use snafu::Snafu;

/// Error type for codec operations.
#[derive(Debug, Snafu)]
pub enum CodecError {
    /// Value could not be serialized.
    #[snafu(display("postcard encode failed: {source}"))]
    Encode {
        /// The underlying postcard error.
        source: postcard::Error,
    },

    /// Bytes could not be deserialized.
    #[snafu(display("postcard decode failed: {source}"))]
    Decode {
        /// The underlying postcard error.
        source: postcard::Error,
    },
}

/// Serializes `value` to its canonical postcard byte form.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(value).map_err(|source| CodecError::Encode { source })
}

/// Deserializes a value from postcard bytes.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the bytes are not a valid encoding of
/// `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    postcard::from_bytes(bytes).map_err(|source| CodecError::Decode { source })
}
