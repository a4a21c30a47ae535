//! Opcode tables, field extraction, and word encoders for the three
//! instruction formats.
//!
//! Bit layout (high to low):
//!
//! ```text
//! R: | opcode:6 | rs:5 | rt:5 | rd:5 | shamt:5 | funct:6 |
//! I: | opcode:6 | rs:5 | rt:5 |         immediate:16     |
//! J: | opcode:6 |               target:26                |
//! ```

/// Primary opcode shared by every register-format instruction.
pub const SPECIAL_OPCODE: u8 = 0x00;

/// The three instruction encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Format {
    /// Register format (opcode 0, operation picked by the function field).
    Register,
    /// Immediate format.
    Immediate,
    /// Jump format.
    Jump,
}

/// Function field values recognized under opcode 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Function {
    Sll = 0x00,
    Srl = 0x02,
    Jr = 0x08,
    Addu = 0x21,
    Subu = 0x23,
    And = 0x24,
    Or = 0x25,
    Slt = 0x2A,
}

impl Function {
    /// Returns the 6-bit function field value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Immediate-format opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ImmediateOpcode {
    Beq = 0x04,
    Bne = 0x05,
    Addiu = 0x09,
    Andi = 0x0C,
    Ori = 0x0D,
    Lui = 0x0F,
    Lw = 0x23,
    Sw = 0x2B,
}

impl ImmediateOpcode {
    /// Returns the 6-bit opcode value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Jump-format opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum JumpOpcode {
    J = 0x02,
    Jal = 0x03,
}

impl JumpOpcode {
    /// Returns the 6-bit opcode value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Typed selector of an operation within its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeClass {
    /// Opcode 0 with the given function field.
    Register(Function),
    /// Immediate-format operation.
    Immediate(ImmediateOpcode),
    /// Jump-format operation.
    Jump(JumpOpcode),
}

impl OpcodeClass {
    /// Returns the encoding this class uses.
    #[must_use]
    pub const fn format(self) -> Format {
        match self {
            Self::Register(_) => Format::Register,
            Self::Immediate(_) => Format::Immediate,
            Self::Jump(_) => Format::Jump,
        }
    }
}

/// Every supported operation, flattened across formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Operation {
    Addu,
    Subu,
    Sll,
    Srl,
    And,
    Or,
    Slt,
    Jr,
    Addiu,
    Andi,
    Ori,
    Lui,
    Beq,
    Bne,
    Lw,
    Sw,
    J,
    Jal,
}

impl Operation {
    /// Assembler mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Addu => "addu",
            Self::Subu => "subu",
            Self::Sll => "sll",
            Self::Srl => "srl",
            Self::And => "and",
            Self::Or => "or",
            Self::Slt => "slt",
            Self::Jr => "jr",
            Self::Addiu => "addiu",
            Self::Andi => "andi",
            Self::Ori => "ori",
            Self::Lui => "lui",
            Self::Beq => "beq",
            Self::Bne => "bne",
            Self::Lw => "lw",
            Self::Sw => "sw",
            Self::J => "j",
            Self::Jal => "jal",
        }
    }

    /// Typed opcode or function selector for this operation.
    #[must_use]
    pub const fn class(self) -> OpcodeClass {
        match self {
            Self::Addu => OpcodeClass::Register(Function::Addu),
            Self::Subu => OpcodeClass::Register(Function::Subu),
            Self::Sll => OpcodeClass::Register(Function::Sll),
            Self::Srl => OpcodeClass::Register(Function::Srl),
            Self::And => OpcodeClass::Register(Function::And),
            Self::Or => OpcodeClass::Register(Function::Or),
            Self::Slt => OpcodeClass::Register(Function::Slt),
            Self::Jr => OpcodeClass::Register(Function::Jr),
            Self::Addiu => OpcodeClass::Immediate(ImmediateOpcode::Addiu),
            Self::Andi => OpcodeClass::Immediate(ImmediateOpcode::Andi),
            Self::Ori => OpcodeClass::Immediate(ImmediateOpcode::Ori),
            Self::Lui => OpcodeClass::Immediate(ImmediateOpcode::Lui),
            Self::Beq => OpcodeClass::Immediate(ImmediateOpcode::Beq),
            Self::Bne => OpcodeClass::Immediate(ImmediateOpcode::Bne),
            Self::Lw => OpcodeClass::Immediate(ImmediateOpcode::Lw),
            Self::Sw => OpcodeClass::Immediate(ImmediateOpcode::Sw),
            Self::J => OpcodeClass::Jump(JumpOpcode::J),
            Self::Jal => OpcodeClass::Jump(JumpOpcode::Jal),
        }
    }

    /// Encoding used by this operation.
    #[must_use]
    pub const fn format(self) -> Format {
        self.class().format()
    }

    /// Operations that commit a result through register write-back.
    #[must_use]
    pub const fn writes_register(self) -> bool {
        !matches!(self, Self::Jr | Self::Beq | Self::Bne | Self::Sw | Self::J)
    }

    /// Operations that access the data region.
    #[must_use]
    pub const fn is_memory_access(self) -> bool {
        matches!(self, Self::Lw | Self::Sw)
    }
}

/// Operation table: `(opcode, funct, operation)`. The decoder resolves every
/// word through [`classify_operation`].
///
/// `funct` is only meaningful for opcode 0. Any pair not listed is illegal.
pub const OPERATION_TABLE: &[(u8, Option<u8>, Operation)] = &[
    (0x00, Some(0x21), Operation::Addu),
    (0x00, Some(0x23), Operation::Subu),
    (0x00, Some(0x00), Operation::Sll),
    (0x00, Some(0x02), Operation::Srl),
    (0x00, Some(0x24), Operation::And),
    (0x00, Some(0x25), Operation::Or),
    (0x00, Some(0x2A), Operation::Slt),
    (0x00, Some(0x08), Operation::Jr),
    (0x09, None, Operation::Addiu),
    (0x0C, None, Operation::Andi),
    (0x0D, None, Operation::Ori),
    (0x0F, None, Operation::Lui),
    (0x04, None, Operation::Beq),
    (0x05, None, Operation::Bne),
    (0x23, None, Operation::Lw),
    (0x2B, None, Operation::Sw),
    (0x02, None, Operation::J),
    (0x03, None, Operation::Jal),
];

/// Looks up the operation named by an opcode and (for opcode 0) function field.
#[must_use]
pub fn classify_operation(opcode: u8, funct: u8) -> Option<Operation> {
    OPERATION_TABLE
        .iter()
        .find_map(|(entry_opcode, entry_funct, operation)| {
            let funct_matches = entry_funct.is_none() || *entry_funct == Some(funct);
            (*entry_opcode == opcode && funct_matches).then_some(*operation)
        })
}

/// Bits 31..26.
#[must_use]
pub const fn opcode_field(word: u32) -> u8 {
    ((word >> 26) & 0x3F) as u8
}

/// Bits 25..21.
#[must_use]
pub const fn rs_field(word: u32) -> u32 {
    (word >> 21) & 0x1F
}

/// Bits 20..16.
#[must_use]
pub const fn rt_field(word: u32) -> u32 {
    (word >> 16) & 0x1F
}

/// Bits 15..11.
#[must_use]
pub const fn rd_field(word: u32) -> u32 {
    (word >> 11) & 0x1F
}

/// Bits 10..6.
#[must_use]
pub const fn shamt_field(word: u32) -> u8 {
    ((word >> 6) & 0x1F) as u8
}

/// Bits 5..0.
#[must_use]
pub const fn funct_field(word: u32) -> u8 {
    (word & 0x3F) as u8
}

/// Bits 15..0.
#[must_use]
pub const fn immediate_field(word: u32) -> u16 {
    (word & 0xFFFF) as u16
}

/// Bits 25..0.
#[must_use]
pub const fn target_field(word: u32) -> u32 {
    word & 0x03FF_FFFF
}

/// Sign-extends a 16-bit immediate using bit 15 as the sign.
#[must_use]
pub const fn sign_extend_16(imm: u16) -> i32 {
    imm as i16 as i32
}

/// Encodes a register-format word.
#[must_use]
pub const fn encode_register(rs: u8, rt: u8, rd: u8, shamt: u8, funct: u8) -> u32 {
    ((SPECIAL_OPCODE as u32) << 26)
        | (((rs & 0x1F) as u32) << 21)
        | (((rt & 0x1F) as u32) << 16)
        | (((rd & 0x1F) as u32) << 11)
        | (((shamt & 0x1F) as u32) << 6)
        | ((funct & 0x3F) as u32)
}

/// Encodes an immediate-format word.
#[must_use]
pub const fn encode_immediate(opcode: u8, rs: u8, rt: u8, immediate: u16) -> u32 {
    (((opcode & 0x3F) as u32) << 26)
        | (((rs & 0x1F) as u32) << 21)
        | (((rt & 0x1F) as u32) << 16)
        | (immediate as u32)
}

/// Encodes a jump-format word from its 26-bit target field.
#[must_use]
pub const fn encode_jump(opcode: u8, target: u32) -> u32 {
    (((opcode & 0x3F) as u32) << 26) | (target & 0x03FF_FFFF)
}
