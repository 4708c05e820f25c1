//! Crate-wide error types.
//!
//! One `thiserror`-derived enum per concern, matching the common
//! `ioi_types::error` convention of a dedicated error type per subsystem
//! rather than one catch-all enum.

use thiserror::Error;

/// Errors arising from the canonical codec (encode/decode/hash).
#[derive(Debug, Error)]
pub enum CodecError {
    /// Serialization to the canonical binary format failed.
    #[error("canonical encode failed: {0}")]
    Encode(String),
    /// Deserialization from the canonical binary format failed.
    #[error("canonical decode failed: {0}")]
    Decode(String),
    /// The leading tag byte did not match any known transaction variant.
    #[error("unknown transaction tag byte: {0}")]
    UnknownTag(u8),
    /// Hashing the canonical encoding failed.
    #[error("hashing failed: {0}")]
    Hash(String),
}

/// Errors arising while constructing or validating a `Map` (tokenization
/// sub-value, §4.3).
#[derive(Debug, Error)]
pub enum MapError {
    /// The requested key does not exist in the map.
    #[error("key not found in map")]
    NotFound,
    /// The map's serialized byte form could not be parsed.
    #[error("map deserialization failed: {0}")]
    Decode(String),
}

/// A crate-wide `Result` alias, matching `ioi_types::Result`'s shape.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;
