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

//! # corechain-types
//!
//! Core data structures, the canonical binary codec, and shared error types
//! for the corechain miner.
//!
//! ## Architectural role
//!
//! As the base crate, `corechain-types` has minimal dependencies (only
//! `corechain-crypto`, for hashing) and is itself a dependency of almost
//! every other crate in the workspace — the same role `ioi_types` plays in
//! a shared production idiom.

/// Per-account persistent state (§3, C6).
pub mod account;
/// Blocks (§3, C4).
pub mod block;
/// The canonical, deterministic binary codec (§2, C2).
pub mod codec;
/// Shared error types.
pub mod error;
/// The tokenization sub-value (§4.3).
pub mod map;
/// The transaction sum type and its shared capability surface (§3, C2).
pub mod transaction;

pub use account::Account;
pub use block::{Block, BlockHeader};
pub use error::CodecError;
pub use map::Map;
pub use transaction::{AccTx, ConfigTx, FundsTx, StakeTx, Transaction, TxHash, TxKind};
