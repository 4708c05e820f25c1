//! Pipeline-layer error types.

use corechain_types::CodecError;
use corechain_vm::VmError;
use thiserror::Error;

/// Why a single transaction could not be admitted or applied.
#[derive(Debug, Error)]
pub enum TxError {
    /// The transaction's canonical encoding could not be produced.
    #[error("transaction codec error: {0}")]
    Codec(#[from] CodecError),
    /// A `FundsTx`/`ConfigTx`/`StakeTx` names a sender with no known account.
    #[error("unknown sender account")]
    UnknownSender,
    /// An `AccTx` names an address that is already in use.
    #[error("account already exists")]
    AccountExists,
    /// The sender's `tx_count` does not match the transaction's (replay
    /// protection, §4.4).
    #[error("nonce mismatch: account is at {expected}, transaction carries {got}")]
    NonceMismatch {
        /// The sender account's current `tx_count`.
        expected: u32,
        /// The `tx_count` the transaction carries.
        got: u32,
    },
    /// The sender's balance cannot cover `amount + fee`.
    #[error("insufficient balance")]
    InsufficientBalance,
    /// Signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,
    /// The transaction was already present in the block (duplicate by
    /// hash).
    #[error("duplicate transaction")]
    Duplicate,
    /// A `FundsTx` carried call-data for a receiver with no deployed
    /// contract.
    #[error("receiver is not a contract account")]
    NotAContract,
    /// The invoked contract's execution failed.
    #[error("contract execution failed: {0}")]
    Vm(#[from] VmError),
}

/// Why a candidate block failed validation (§4.4: "typed block-validation
/// errors naming the first offending transaction").
#[derive(Debug, Error)]
pub enum BlockError {
    /// `height(b) != height(parent(b)) + 1`.
    #[error("block height {got} does not follow parent height {parent}")]
    HeightMismatch {
        /// The parent block's height.
        parent: u64,
        /// The candidate block's height.
        got: u64,
    },
    /// The candidate's `parent_hash` does not match the supplied parent.
    #[error("block does not link to the expected parent")]
    ParentMismatch,
    /// The first transaction (by index) that failed admission or
    /// application.
    #[error("transaction {index} rejected: {source}")]
    Transaction {
        /// Index of the offending transaction within the block.
        index: usize,
        /// The underlying cause.
        #[source]
        source: TxError,
    },
    /// A transient failure propagated unchanged from the persistent store
    /// (§4.4: "Transient I/O errors from C1 are propagated unchanged").
    #[error(transparent)]
    Storage(#[from] corechain_storage::StorageError),
    /// The block's canonical encoding could not be produced.
    #[error("block codec error: {0}")]
    Codec(#[from] CodecError),
}
