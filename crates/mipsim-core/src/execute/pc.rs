//! Next-PC computation.

use crate::decoder::DecodedInstruction;
use crate::encoding::{Function, ImmediateOpcode, JumpOpcode};
use crate::state::{ArchitecturalState, Register};

/// PC-stage effects of one instruction, computed before anything is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PcUpdate {
    /// Address of the next instruction.
    pub next_pc: u32,
    /// Return address to commit into `$31` (`jal` only).
    pub link: Option<u32>,
}

impl PcUpdate {
    /// Applies the update to the register file and program counter.
    pub fn commit(self, arch: &mut ArchitecturalState) {
        if let Some(link) = self.link {
            arch.set_gpr(Register::RA, link);
        }
        arch.set_pc(self.next_pc);
    }
}

/// Computes the next PC from the executor's `result` and the fetch `pc`.
///
/// Every instruction starts from `pc + 4`. Branches add their (possibly zero)
/// offset to that, `j`/`jal` take the decoded target, and `jr` takes the
/// register value the executor passed through.
#[must_use]
pub const fn update_pc(instruction: &DecodedInstruction, result: u32, pc: u32) -> PcUpdate {
    let sequential = pc.wrapping_add(4);
    match instruction {
        DecodedInstruction::Immediate {
            opcode: ImmediateOpcode::Beq | ImmediateOpcode::Bne,
            ..
        } => PcUpdate {
            next_pc: sequential.wrapping_add(result),
            link: None,
        },
        DecodedInstruction::Jump {
            opcode: JumpOpcode::J,
            target,
        } => PcUpdate {
            next_pc: *target,
            link: None,
        },
        DecodedInstruction::Jump {
            opcode: JumpOpcode::Jal,
            target,
        } => PcUpdate {
            next_pc: *target,
            link: Some(sequential),
        },
        DecodedInstruction::Register {
            function: Function::Jr,
            ..
        } => PcUpdate {
            next_pc: result,
            link: None,
        },
        _ => PcUpdate {
            next_pc: sequential,
            link: None,
        },
    }
}
