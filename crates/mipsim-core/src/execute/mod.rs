//! Instruction execution pipeline.
//!
//! One cycle runs these stages in order against a single [`MachineState`]:
//! 1. Fetch the word at PC
//! 2. Decode and snapshot source registers
//! 3. Execute (pure, yields one 32-bit result)
//! 4. Compute the next PC
//! 5. Memory access (validate, then load or store)
//! 6. Commit the PC update
//! 7. Register write-back
//!
//! Faults are precise: a cycle that halts commits nothing.
//!
//! [`MachineState`]: crate::MachineState

mod cycle;
mod helpers;
mod memory_stage;
mod pc;
mod writeback;

pub use cycle::{run, step_one};
pub use helpers::{
    branch_offset, compute_effective_address, extend_logical_immediate, set_less_than,
};
pub use memory_stage::{memory_access, DataAccess, MemoryStageOutcome};
pub use pc::{update_pc, PcUpdate};
pub use writeback::write_back;

use crate::decoder::{DecodedInstruction, RegisterSnapshot};
use crate::encoding::{Function, ImmediateOpcode, JumpOpcode};
use crate::ImmediateExtension;

/// Computes the single result value of `instruction`.
///
/// `pc` is the address the instruction was fetched from. Pure: reads only
/// the snapshot, never the live register file.
#[must_use]
pub const fn execute(
    instruction: &DecodedInstruction,
    snapshot: &RegisterSnapshot,
    pc: u32,
    logical_immediate: ImmediateExtension,
) -> u32 {
    match instruction {
        DecodedInstruction::Register {
            function, shamt, ..
        } => execute_register(*function, snapshot, *shamt),
        DecodedInstruction::Immediate {
            opcode, immediate, ..
        } => execute_immediate(*opcode, snapshot, *immediate, logical_immediate),
        DecodedInstruction::Jump { opcode, .. } => match opcode {
            JumpOpcode::Jal => pc.wrapping_add(4),
            JumpOpcode::J => 0,
        },
    }
}

const fn execute_register(function: Function, snapshot: &RegisterSnapshot, shamt: u8) -> u32 {
    let rs = snapshot.rs;
    let rt = snapshot.rt;
    match function {
        Function::Addu => rs.wrapping_add(rt),
        Function::Subu => rs.wrapping_sub(rt),
        Function::Sll => rt.wrapping_shl(shamt as u32),
        Function::Srl => rt.wrapping_shr(shamt as u32),
        Function::And => rs & rt,
        Function::Or => rs | rt,
        Function::Slt => set_less_than(rs, rt),
        Function::Jr => rs,
    }
}

#[allow(clippy::cast_sign_loss)]
const fn execute_immediate(
    opcode: ImmediateOpcode,
    snapshot: &RegisterSnapshot,
    immediate: i32,
    logical_immediate: ImmediateExtension,
) -> u32 {
    let rs = snapshot.rs;
    let rt = snapshot.rt;
    match opcode {
        ImmediateOpcode::Addiu | ImmediateOpcode::Lw | ImmediateOpcode::Sw => {
            compute_effective_address(rs, immediate)
        }
        ImmediateOpcode::Andi => rs & extend_logical_immediate(immediate, logical_immediate),
        ImmediateOpcode::Ori => rs | extend_logical_immediate(immediate, logical_immediate),
        ImmediateOpcode::Lui => (immediate as u32).wrapping_shl(16),
        ImmediateOpcode::Beq => {
            if rs.wrapping_sub(rt) == 0 {
                branch_offset(immediate)
            } else {
                0
            }
        }
        ImmediateOpcode::Bne => {
            if rs.wrapping_sub(rt) == 0 {
                0
            } else {
                branch_offset(immediate)
            }
        }
    }
}
