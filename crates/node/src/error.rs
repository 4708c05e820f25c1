//! Node-level error type: wraps the lower crates' errors plus
//! configuration failures, so `main` has exactly one error type to
//! propagate with `?` up to `anyhow`.

use thiserror::Error;

/// Errors surfaced while loading configuration or wiring a node together.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The configuration file could not be parsed or was missing a
    /// required field.
    #[error("configuration error: {0}")]
    Config(String),
    /// The persistent store could not be opened.
    #[error(transparent)]
    Storage(#[from] corechain_storage::StorageError),
}
