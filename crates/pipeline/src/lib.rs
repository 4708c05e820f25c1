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

//! # corechain-pipeline
//!
//! Block construction, transaction admission, finalization, and
//! replay-based validation (§4.4, C4), plus the in-memory account working
//! set transactions are validated against (§3, C6).

/// The in-memory account working set.
pub mod account_state;
/// Pipeline- and transaction-level error types.
pub mod error;
/// `new_block` / `add_tx` / `finalize_block` / `validate_block`.
pub mod pipeline;

pub use account_state::AccountState;
pub use error::{BlockError, TxError};
pub use pipeline::{add_tx, finalize_block, new_block, validate_block};
