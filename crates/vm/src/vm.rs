//! The stack machine itself (§4.3, C3).

use tracing::{instrument, trace};

use corechain_types::Map;

use crate::error::VmError;
use crate::opcode;

/// Contextual values a running contract can read (`CTX`, §4.3).
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// The calling account's address.
    pub caller: [u8; 32],
    /// The amount carried by the invoking `FundsTx`.
    pub amount: u64,
    /// The height of the block this call is being processed in.
    pub block_height: u64,
    /// The timestamp of the block this call is being processed in.
    pub timestamp: u64,
}

/// The result of a completed execution (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmOutcome {
    /// Whether the program reached a `HALT` (as opposed to running out of
    /// code without one, which is itself an error — see [`VmError::OutOfBounds`]).
    pub halted: bool,
    /// The contract-variable slots as they stand after execution. The
    /// caller (`corechain-pipeline`) is responsible for persisting these
    /// back to the account only once the whole enclosing block commits.
    pub updated_variables: Vec<Vec<u8>>,
}

/// Executes `code` against `contract_variables`, with `call_data` supplied
/// by the invoking `FundsTx` (§4.3).
///
/// `step_budget` bounds the number of opcodes executed; exceeding it is a
/// [`VmError::StepBudgetExceeded`] rather than a silent infinite loop.
#[instrument(skip(code, call_data, contract_variables, context))]
pub fn execute(
    code: &[u8],
    call_data: &[u8],
    contract_variables: &[Vec<u8>],
    context: &ExecutionContext,
    step_budget: u64,
) -> Result<VmOutcome, VmError> {
    let mut machine = Machine {
        code,
        pc: 0,
        stack: Vec::new(),
        variables: contract_variables.to_vec(),
    };

    let mut steps = 0u64;
    loop {
        if steps >= step_budget {
            return Err(VmError::StepBudgetExceeded(step_budget));
        }
        steps += 1;

        let op = *machine
            .code
            .get(machine.pc)
            .ok_or(VmError::OutOfBounds { pc: machine.pc })?;
        trace!(pc = machine.pc, opcode = op, "vm step");

        if op == opcode::HALT_A || op == opcode::HALT_B {
            return Ok(VmOutcome {
                halted: true,
                updated_variables: machine.variables,
            });
        }

        machine.step(op, call_data, context)?;
    }
}

struct Machine<'a> {
    code: &'a [u8],
    pc: usize,
    stack: Vec<Vec<u8>>,
    variables: Vec<Vec<u8>>,
}

impl<'a> Machine<'a> {
    fn step(
        &mut self,
        op: u8,
        call_data: &[u8],
        context: &ExecutionContext,
    ) -> Result<(), VmError> {
        match op {
            opcode::PUSH => {
                let literal = self.read_operand(2)?;
                self.stack.push(literal);
                self.pc += 3;
            }
            opcode::ADD => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.stack.push(add_be(&a, &b));
                self.pc += 1;
            }
            opcode::DUP => {
                let top = self.stack.last().cloned().ok_or(VmError::StackUnderflow { pc: self.pc })?;
                self.stack.push(top);
                self.pc += 1;
            }
            opcode::JMPIF => {
                let target = self.read_operand(2)?;
                let cond = self.pop()?;
                self.pc = if is_nonzero(&cond) {
                    be_u16(&target) as usize
                } else {
                    self.pc + 3
                };
            }
            opcode::JMP => {
                let target = self.read_operand(2)?;
                self.pc = be_u16(&target) as usize;
            }
            opcode::SSTORE => {
                let slot = self.read_u8_operand()? as usize;
                let value = self.pop()?;
                if slot >= self.variables.len() {
                    self.variables.resize(slot + 1, Vec::new());
                }
                self.variables[slot] = value;
                self.pc += 2;
            }
            opcode::CTX => {
                let selector = self.read_u8_operand()?;
                let value = match selector {
                    0 => u64_to_be_min(context.amount),
                    1 => context.caller[..2].to_vec(),
                    2 => u64_to_be_min(context.block_height),
                    other => return Err(VmError::InvalidOpcode(other, self.pc)),
                };
                self.stack.push(value);
                self.pc += 2;
            }
            opcode::SLOAD => {
                let slot = self.read_u8_operand()? as usize;
                let value = self.variables.get(slot).cloned().unwrap_or_default();
                self.stack.push(value);
                self.pc += 2;
            }
            opcode::POP => {
                self.pop()?;
                self.pc += 1;
            }
            opcode::CALLDATA => {
                for group in parse_call_data(call_data) {
                    self.stack.push(group);
                }
                self.pc += 1;
            }
            opcode::MAP_NEW => {
                self.stack.push(Map::new().serialize());
                self.pc += 1;
            }
            opcode::MAP_GET => {
                let map_bytes = self.pop()?;
                let key = self.pop()?;
                let map = Map::deserialize(&map_bytes).map_err(|e| VmError::InvalidMap(e.to_string()))?;
                let value = map.get_val(&key).unwrap_or_default();
                self.stack.push(value);
                self.pc += 1;
            }
            opcode::MAP_SET => {
                let map_bytes = self.pop()?;
                let key = self.pop()?;
                let value = self.pop()?;
                let mut map = Map::deserialize(&map_bytes).map_err(|e| VmError::InvalidMap(e.to_string()))?;
                map.set_val(key, value);
                self.stack.push(map.serialize());
                self.pc += 1;
            }
            other => return Err(VmError::InvalidOpcode(other, self.pc)),
        }
        Ok(())
    }

    fn pop(&mut self) -> Result<Vec<u8>, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow { pc: self.pc })
    }

    fn read_operand(&self, len: usize) -> Result<Vec<u8>, VmError> {
        self.code
            .get(self.pc + 1..self.pc + 1 + len)
            .map(<[u8]>::to_vec)
            .ok_or(VmError::OutOfBounds { pc: self.pc })
    }

    fn read_u8_operand(&self) -> Result<u8, VmError> {
        self.code
            .get(self.pc + 1)
            .copied()
            .ok_or(VmError::OutOfBounds { pc: self.pc })
    }
}

/// Whether `value`, read as a big-endian unsigned integer, is nonzero.
fn is_nonzero(value: &[u8]) -> bool {
    value.iter().any(|&b| b != 0)
}

fn be_u16(bytes: &[u8]) -> u16 {
    let mut buf = [0u8; 2];
    let start = bytes.len().saturating_sub(2);
    buf[2 - (bytes.len() - start)..].copy_from_slice(&bytes[start..]);
    u16::from_be_bytes(buf)
}

fn u64_to_be_min(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[first_nonzero..].to_vec()
}

/// Parses the entire call-data buffer into tag-framed groups: each group is
/// a tag byte followed by a 1-byte value (tag `0`) or a 2-byte big-endian
/// value (tag `1`). Trailing bytes too short to form another group are
/// ignored (derived from the scenario 1/2/4 call-data fixtures; this
/// framing is nowhere documented explicitly, only exercised).
fn parse_call_data(call_data: &[u8]) -> Vec<Vec<u8>> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < call_data.len() {
        let tag = call_data[i];
        let width = if tag == 0 { 1 } else { 2 };
        if i + 1 + width > call_data.len() {
            break;
        }
        groups.push(call_data[i + 1..i + 1 + width].to_vec());
        i += 1 + width;
    }
    groups
}

/// Big-endian unsigned addition. The result's width is `max(len(a), len(b))`,
/// growing by exactly one byte on overflow (§9 design note).
fn add_be(a: &[u8], b: &[u8]) -> Vec<u8> {
    let width = a.len().max(b.len());
    let mut result = vec![0u8; width];
    let mut carry = 0u16;
    for i in 0..width {
        let av = byte_from_end(a, i);
        let bv = byte_from_end(b, i);
        let sum = av as u16 + bv as u16 + carry;
        result[width - 1 - i] = (sum & 0xff) as u8;
        carry = sum >> 8;
    }
    if carry > 0 {
        let mut out = Vec::with_capacity(width + 1);
        out.push(carry as u8);
        out.extend(result);
        out
    } else {
        result
    }
}

fn byte_from_end(bytes: &[u8], index_from_end: usize) -> u8 {
    if index_from_end >= bytes.len() {
        0
    } else {
        bytes[bytes.len() - 1 - index_from_end]
    }
}
