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

//! # corechain-vm
//!
//! The stack-based smart-contract virtual machine (§4.3, C3): an 8-bit
//! opcode set operating over a stack of variable-width big-endian byte
//! strings, a fixed set of contract-variable slots, and a bounded
//! per-call step budget in place of conventional gas metering.

/// VM-layer error type.
pub mod error;
/// The opcode table.
pub mod opcode;
/// The machine itself.
pub mod vm;

pub use error::VmError;
pub use vm::{execute, ExecutionContext, VmOutcome};
