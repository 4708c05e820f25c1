//! The opcode table.
//!
//! Most opcodes and their operand widths come directly from the literal
//! deploy/call bytecode fixtures the contract test scenarios exercise —
//! see `DESIGN.md` for the derivation. Three opcodes (`10`, `24`, `33`)
//! are otherwise undocumented because no required scenario's bytecode
//! exercises them directly; they are given the plausible stack-machine
//! reading below (`DUP`, `JMP`, `POP`) for completeness of the table.

/// Pushes a 2-byte big-endian literal that follows the opcode.
pub const PUSH: u8 = 0;
/// Pops the top two values, pushes their big-endian unsigned sum.
pub const ADD: u8 = 4;
/// Duplicates the top of the stack.
pub const DUP: u8 = 10;
/// Pops a condition; if nonzero, jumps to the following 2-byte absolute pc.
pub const JMPIF: u8 = 22;
/// Jumps unconditionally to the following 2-byte absolute pc.
pub const JMP: u8 = 24;
/// Pops a value and stores it into the contract-variable slot named by the
/// following 1-byte index.
pub const SSTORE: u8 = 27;
/// Pushes a value from the execution context, selected by a following
/// 1-byte tag (`0` = call amount, `1` = caller address prefix, `2` = block
/// height). Any other tag is an invalid opcode.
pub const CTX: u8 = 28;
/// Pushes a copy of the contract-variable slot named by the following
/// 1-byte index.
pub const SLOAD: u8 = 29;
/// Pops and discards the top of the stack.
pub const POP: u8 = 33;
/// Parses the entire call-data buffer into tag-framed groups and pushes
/// each group's value, in encountered order (§4.3, §8).
pub const CALLDATA: u8 = 35;
/// Pushes a freshly created, empty tokenization [`corechain_types::Map`].
pub const MAP_NEW: u8 = 38;
/// Pops `map`, then `key`; pushes `map.get_val(key)` (or a zero value if
/// absent).
pub const MAP_GET: u8 = 39;
/// Pops `map`, then `key`, then `value`; pushes the map with `key` set to
/// `value`.
pub const MAP_SET: u8 = 40;
/// Terminates execution successfully. Both `49` and `50` are documented
/// as this opcode; both are accepted.
pub const HALT_A: u8 = 49;
/// See [`HALT_A`].
pub const HALT_B: u8 = 50;
