//! VM-layer error type.

use thiserror::Error;

/// Failures a contract execution can raise. None of these panic the miner:
/// a failing execution simply makes the calling transaction invalid (§4.3).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VmError {
    /// An opcode popped more operands than the stack held.
    #[error("stack underflow at pc {pc}")]
    StackUnderflow {
        /// Instruction pointer at the time of the fault.
        pc: usize,
    },
    /// The program counter ran past the end of the code without a HALT.
    #[error("program counter {pc} ran past the end of the code")]
    OutOfBounds {
        /// Instruction pointer at the time of the fault.
        pc: usize,
    },
    /// An opcode byte with no defined meaning.
    #[error("unknown opcode {0} at pc {1}")]
    InvalidOpcode(u8, usize),
    /// A contract-variable slot index was out of range for a fixed-size
    /// access; `SSTORE`/`SLOAD` instead grow sparse slots on write (§3).
    #[error("contract variable slot {0} out of range")]
    InvalidSlot(usize),
    /// Execution did not `HALT` within the caller-supplied step budget
    /// (§4.3: "a per-call step budget bounds execution").
    #[error("execution exceeded its step budget of {0}")]
    StepBudgetExceeded(u64),
    /// A `MAP-GET`/`MAP-SET` operand could not be read as a `Map`.
    #[error("invalid tokenization map: {0}")]
    InvalidMap(String),
}
