//! Storage-layer error type.

use thiserror::Error;

/// Errors surfaced by the persistent store. Failures are reported verbatim
/// from the underlying KV collaborator; this layer does not retry (§4.1).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The embedded database backend returned an error.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A value read from a bucket could not be decoded.
    #[error("stored value could not be decoded: {0}")]
    Decode(String),
    /// The requested key was not present in the bucket.
    #[error("key not found")]
    NotFound,
}
