#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo
    )
)]

//! # corechain-storage
//!
//! Persistent block/transaction buckets, the transaction mempool, and the
//! received-block stash (§3, C1).
//!
//! `redb` plays the role an epoch store plays elsewhere
//! repository: a single embedded database opened once per node, with one
//! `TableDefinition` per logical bucket.

/// Errors this crate returns.
pub mod error;
/// The concurrent open/invalid transaction pools.
pub mod mempool;
/// The bounded, deduplicating received-block stash.
pub mod stash;
/// The seven persistent buckets plus the account table.
pub mod store;

pub use error::StorageError;
pub use mempool::Mempool;
pub use stash::{ReceivedBlockStash, STASH_CAPACITY};
pub use store::Store;
