//! Instruction decoder.
//!
//! Classifies a raw word into one of the three formats, extracts its typed
//! fields, and reads the source-register values the later stages need so
//! that no stage re-reads the register file mid-cycle.

use thiserror::Error;

use crate::encoding::{
    classify_operation, encode_immediate, encode_jump, encode_register, funct_field,
    immediate_field, opcode_field, rd_field, rs_field, rt_field, shamt_field, sign_extend_16,
    target_field, Format, Function, ImmediateOpcode, JumpOpcode, OpcodeClass, Operation,
};
use crate::state::{ArchitecturalState, Register};
use crate::HaltCause;

/// Mask selecting the PC bits a jump target inherits (bits 31..28).
pub const JUMP_REGION_MASK: u32 = 0xF000_0000;

/// Decoded instruction: exactly one format's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DecodedInstruction {
    /// Register format (opcode 0).
    Register {
        /// Operation selected by the function field.
        function: Function,
        /// First source register.
        rs: Register,
        /// Second source register.
        rt: Register,
        /// Destination register.
        rd: Register,
        /// Shift amount (`0..32`).
        shamt: u8,
    },
    /// Immediate format.
    Immediate {
        /// Operation selected by the opcode.
        opcode: ImmediateOpcode,
        /// Source register.
        rs: Register,
        /// Target register (destination or second operand).
        rt: Register,
        /// 16-bit field sign-extended to 32 bits.
        immediate: i32,
    },
    /// Jump format.
    Jump {
        /// Operation selected by the opcode.
        opcode: JumpOpcode,
        /// Absolute target: field shifted left 2, top 4 bits from the fetch PC.
        target: u32,
    },
}

impl DecodedInstruction {
    /// Returns the flattened operation.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Register { function, .. } => match function {
                Function::Sll => Operation::Sll,
                Function::Srl => Operation::Srl,
                Function::Jr => Operation::Jr,
                Function::Addu => Operation::Addu,
                Function::Subu => Operation::Subu,
                Function::And => Operation::And,
                Function::Or => Operation::Or,
                Function::Slt => Operation::Slt,
            },
            Self::Immediate { opcode, .. } => match opcode {
                ImmediateOpcode::Beq => Operation::Beq,
                ImmediateOpcode::Bne => Operation::Bne,
                ImmediateOpcode::Addiu => Operation::Addiu,
                ImmediateOpcode::Andi => Operation::Andi,
                ImmediateOpcode::Ori => Operation::Ori,
                ImmediateOpcode::Lui => Operation::Lui,
                ImmediateOpcode::Lw => Operation::Lw,
                ImmediateOpcode::Sw => Operation::Sw,
            },
            Self::Jump { opcode, .. } => match opcode {
                JumpOpcode::J => Operation::J,
                JumpOpcode::Jal => Operation::Jal,
            },
        }
    }

    /// Returns the encoding format.
    #[must_use]
    pub const fn format(&self) -> Format {
        match self {
            Self::Register { .. } => Format::Register,
            Self::Immediate { .. } => Format::Immediate,
            Self::Jump { .. } => Format::Jump,
        }
    }

    /// Returns the 6-bit primary opcode.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        match self {
            Self::Register { .. } => crate::encoding::SPECIAL_OPCODE,
            Self::Immediate { opcode, .. } => opcode.as_u8(),
            Self::Jump { opcode, .. } => opcode.as_u8(),
        }
    }

    /// Register that write-back commits into, if the operation defines one.
    ///
    /// `jal` reports the link register here even though its value is
    /// committed by the PC updater.
    #[must_use]
    pub const fn destination(&self) -> Option<Register> {
        if !self.operation().writes_register() {
            return None;
        }
        match self {
            Self::Register { rd, .. } => Some(*rd),
            Self::Immediate { rt, .. } => Some(*rt),
            Self::Jump { .. } => Some(Register::RA),
        }
    }

    /// Re-encodes this instruction back to a 32-bit word.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn encode(&self) -> u32 {
        match self {
            Self::Register {
                function,
                rs,
                rt,
                rd,
                shamt,
            } => encode_register(
                rs.number(),
                rt.number(),
                rd.number(),
                *shamt,
                function.as_u8(),
            ),
            Self::Immediate {
                opcode,
                rs,
                rt,
                immediate,
            } => encode_immediate(opcode.as_u8(), rs.number(), rt.number(), *immediate as u16),
            Self::Jump { opcode, target } => encode_jump(opcode.as_u8(), *target >> 2),
        }
    }
}

/// Source-register values read at decode time.
///
/// Unused slots are zero: jump-format instructions read nothing and
/// immediate-format instructions leave `rd` unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterSnapshot {
    /// Value of the `rs` register.
    pub rs: u32,
    /// Value of the `rt` register.
    pub rt: u32,
    /// Value of the `rd` register (register format only).
    pub rd: u32,
}

/// Decoder's terminal signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecodeHalt {
    /// The word is all zero bits: the end-of-program sentinel.
    #[error("zero instruction word")]
    ZeroWord,
    /// The opcode (or function field under opcode 0) is not recognized.
    #[error("illegal instruction 0x{word:08x}")]
    IllegalInstruction {
        /// The raw word.
        word: u32,
    },
}

impl From<DecodeHalt> for HaltCause {
    fn from(value: DecodeHalt) -> Self {
        match value {
            DecodeHalt::ZeroWord => Self::ZeroWord,
            DecodeHalt::IllegalInstruction { word } => Self::IllegalInstruction { word },
        }
    }
}

/// Instruction decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Decodes the fields of `word` fetched from `pc`.
    ///
    /// `pc` is the address the word was fetched from; jump targets take their
    /// top four bits from it.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeHalt::ZeroWord`] for an all-zero word and
    /// [`DecodeHalt::IllegalInstruction`] for an unrecognized opcode or function.
    pub fn decode_fields(word: u32, pc: u32) -> Result<DecodedInstruction, DecodeHalt> {
        if word == 0 {
            return Err(DecodeHalt::ZeroWord);
        }

        let Some(operation) = classify_operation(opcode_field(word), funct_field(word)) else {
            return Err(DecodeHalt::IllegalInstruction { word });
        };

        let instruction = match operation.class() {
            OpcodeClass::Register(function) => DecodedInstruction::Register {
                function,
                rs: Register::from_field(rs_field(word)),
                rt: Register::from_field(rt_field(word)),
                rd: Register::from_field(rd_field(word)),
                shamt: shamt_field(word),
            },
            OpcodeClass::Immediate(opcode) => DecodedInstruction::Immediate {
                opcode,
                rs: Register::from_field(rs_field(word)),
                rt: Register::from_field(rt_field(word)),
                immediate: sign_extend_16(immediate_field(word)),
            },
            OpcodeClass::Jump(opcode) => DecodedInstruction::Jump {
                opcode,
                target: (target_field(word) << 2) | (pc & JUMP_REGION_MASK),
            },
        };

        Ok(instruction)
    }

    /// Reads the register values an instruction consumes.
    #[must_use]
    pub const fn snapshot(
        instruction: &DecodedInstruction,
        arch: &ArchitecturalState,
    ) -> RegisterSnapshot {
        match instruction {
            DecodedInstruction::Register { rs, rt, rd, .. } => RegisterSnapshot {
                rs: arch.gpr(*rs),
                rt: arch.gpr(*rt),
                rd: arch.gpr(*rd),
            },
            DecodedInstruction::Immediate { rs, rt, .. } => RegisterSnapshot {
                rs: arch.gpr(*rs),
                rt: arch.gpr(*rt),
                rd: 0,
            },
            DecodedInstruction::Jump { .. } => RegisterSnapshot {
                rs: 0,
                rt: 0,
                rd: 0,
            },
        }
    }

    /// Decodes `word` fetched from the current PC and snapshots its source registers.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode_fields`].
    pub fn decode(
        word: u32,
        arch: &ArchitecturalState,
    ) -> Result<(DecodedInstruction, RegisterSnapshot), DecodeHalt> {
        let instruction = Self::decode_fields(word, arch.pc())?;
        Ok((instruction, Self::snapshot(&instruction, arch)))
    }
}
