//! Instruction disassembly.
//!
//! Converts decoded instructions and raw memory words into assembly text.
//! Branch and jump operands are printed as absolute targets.

use std::fmt;

use crate::decoder::{DecodeHalt, DecodedInstruction, Decoder};
use crate::encoding::{Function, ImmediateOpcode};
use crate::MachineState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Address of the word.
    pub addr: u32,
    /// Raw instruction word.
    pub word: u32,
    /// The instruction mnemonic (e.g. `addu`, `lw`, `halt`).
    pub mnemonic: String,
    /// The formatted operands (e.g. `$8, 4($29)`).
    pub operands: String,
    /// Whether the word is not a recognized encoding.
    pub is_illegal: bool,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{}", self.mnemonic)
        } else {
            write!(f, "{}\t{}", self.mnemonic, self.operands)
        }
    }
}

/// Formats the operand list of `instruction` fetched from `pc`.
#[must_use]
pub fn format_operands(instruction: &DecodedInstruction, pc: u32) -> String {
    match *instruction {
        DecodedInstruction::Register {
            function,
            rs,
            rt,
            rd,
            shamt,
        } => match function {
            Function::Sll | Function::Srl => format!("{rd}, {rt}, {shamt}"),
            Function::Jr => format!("{rs}"),
            Function::Addu | Function::Subu | Function::And | Function::Or | Function::Slt => {
                format!("{rd}, {rs}, {rt}")
            }
        },
        DecodedInstruction::Immediate {
            opcode,
            rs,
            rt,
            immediate,
        } => match opcode {
            ImmediateOpcode::Addiu => format!("{rt}, {rs}, {immediate}"),
            ImmediateOpcode::Andi | ImmediateOpcode::Ori => {
                format!("{rt}, {rs}, 0x{:x}", immediate & 0xFFFF)
            }
            ImmediateOpcode::Lui => format!("{rt}, 0x{:x}", immediate & 0xFFFF),
            ImmediateOpcode::Beq | ImmediateOpcode::Bne => {
                format!("{rs}, {rt}, 0x{:08x}", branch_target(pc, immediate))
            }
            ImmediateOpcode::Lw | ImmediateOpcode::Sw => format!("{rt}, {immediate}({rs})"),
        },
        DecodedInstruction::Jump { target, .. } => format!("0x{target:08x}"),
    }
}

/// Formats `instruction` as `mnemonic<TAB>operands`.
#[must_use]
pub fn format_instruction(instruction: &DecodedInstruction, pc: u32) -> String {
    format!(
        "{}\t{}",
        instruction.operation().mnemonic(),
        format_operands(instruction, pc)
    )
}

#[allow(clippy::cast_sign_loss)]
const fn branch_target(pc: u32, immediate: i32) -> u32 {
    pc.wrapping_add(4).wrapping_add((immediate as u32).wrapping_shl(2))
}

/// Disassembles one raw word as if fetched from `addr`.
///
/// The zero word renders as `halt`; unrecognized words as `.word`.
#[must_use]
pub fn disassemble_word(addr: u32, word: u32) -> DisassemblyRow {
    match Decoder::decode_fields(word, addr) {
        Ok(instruction) => DisassemblyRow {
            addr,
            word,
            mnemonic: instruction.operation().mnemonic().to_owned(),
            operands: format_operands(&instruction, addr),
            is_illegal: false,
        },
        Err(DecodeHalt::ZeroWord) => DisassemblyRow {
            addr,
            word,
            mnemonic: "halt".to_owned(),
            operands: String::new(),
            is_illegal: false,
        },
        Err(DecodeHalt::IllegalInstruction { .. }) => DisassemblyRow {
            addr,
            word,
            mnemonic: ".word".to_owned(),
            operands: format!("0x{word:08x}"),
            is_illegal: true,
        },
    }
}

/// Disassembles the word at `addr`, or `None` outside the memory image.
#[must_use]
pub fn disassemble_one(state: &MachineState, addr: u32) -> Option<DisassemblyRow> {
    state.word(addr).map(|word| disassemble_word(addr, word))
}

/// Disassembles up to `count` consecutive words starting at `start`.
///
/// Stops early at the end of the memory image.
#[must_use]
pub fn disassemble_range(state: &MachineState, start: u32, count: usize) -> Vec<DisassemblyRow> {
    (0..count)
        .map_while(|offset| {
            let offset = u32::try_from(offset).ok()?.checked_mul(4)?;
            disassemble_one(state, start.checked_add(offset)?)
        })
        .collect()
}

/// Disassembles `before` words ahead of `center_pc`, the word at it, and
/// `after` words following it.
///
/// Rows outside the memory image are omitted.
#[must_use]
pub fn disassemble_window(
    state: &MachineState,
    center_pc: u32,
    before: usize,
    after: usize,
) -> Vec<DisassemblyRow> {
    let lead = u32::try_from(before)
        .ok()
        .and_then(|words| words.checked_mul(4))
        .unwrap_or(u32::MAX);
    let first = center_pc
        .saturating_sub(lead)
        .max(state.layout.instruction_base());
    let leading = ((center_pc.saturating_sub(first)) / 4) as usize;
    disassemble_range(state, first, leading.saturating_add(1).saturating_add(after))
}
