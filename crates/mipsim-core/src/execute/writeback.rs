//! Register write-back.

use crate::decoder::DecodedInstruction;
use crate::encoding::JumpOpcode;
use crate::state::{ArchitecturalState, Register};

/// Commits `value` into the destination register of `instruction`.
///
/// Returns the register reported as changed, or `None` for branches, jumps,
/// stores, and `jr`. For `jal` the link value was already committed by the
/// PC stage; `$31` is only reported here.
///
/// With `hardwired_zero` set, a write to `$0` is dropped and reported as no
/// change. Otherwise `$0` is an ordinary register.
pub fn write_back(
    instruction: &DecodedInstruction,
    value: Option<u32>,
    arch: &mut ArchitecturalState,
    hardwired_zero: bool,
) -> Option<Register> {
    let destination = instruction.destination()?;

    if matches!(
        instruction,
        DecodedInstruction::Jump {
            opcode: JumpOpcode::Jal,
            ..
        }
    ) {
        return Some(destination);
    }

    let value = value?;
    if hardwired_zero && destination == Register::ZERO {
        return None;
    }

    arch.set_gpr(destination, value);
    Some(destination)
}
