use thiserror::Error;

/// Fault classes used to group fault codes for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder rejected an instruction word.
    Decode,
    /// Load or store violated the data-region policy.
    Memory,
    /// Program counter left the memory image.
    Fetch,
}

/// Stable fault taxonomy for conditions that halt the simulated core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Opcode or function field does not name a supported operation.
    #[error("illegal instruction encoding")]
    IllegalInstruction = 0x01,
    /// Effective address of a load or store lies outside the data region.
    #[error("data access outside the data region")]
    DataAddressOutOfRange = 0x02,
    /// Effective address of a load or store is not a multiple of four.
    #[error("unaligned data access")]
    UnalignedDataAccess = 0x03,
    /// Program counter does not name an aligned word of the memory image.
    #[error("instruction fetch outside the memory image")]
    FetchOutOfRange = 0x04,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::IllegalInstruction),
            0x02 => Some(Self::DataAddressOutOfRange),
            0x03 => Some(Self::UnalignedDataAccess),
            0x04 => Some(Self::FetchOutOfRange),
            _ => None,
        }
    }

    /// Returns the fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::IllegalInstruction => FaultClass::Decode,
            Self::DataAddressOutOfRange | Self::UnalignedDataAccess => FaultClass::Memory,
            Self::FetchOutOfRange => FaultClass::Fetch,
        }
    }
}

/// Fatal load/store fault carrying the diagnostic the run must report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("Memory Access Exception at 0x{pc:08x}: address 0x{addr:08x}")]
pub struct MemoryAccessException {
    /// Address of the faulting instruction.
    pub pc: u32,
    /// Effective address the instruction tried to access.
    pub addr: u32,
    /// Which rule the address violated.
    pub code: FaultCode,
}

/// Reason the instruction cycle entered its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HaltCause {
    /// Fetched an all-zero word, the program's end sentinel.
    #[error("halt sentinel reached")]
    ZeroWord,
    /// Fetched a word whose opcode or function field is not recognized.
    #[error("illegal instruction 0x{word:08x}")]
    IllegalInstruction {
        /// The raw instruction word.
        word: u32,
    },
    /// A load or store violated the data-region policy.
    #[error(transparent)]
    MemoryAccess(#[from] MemoryAccessException),
    /// The program counter left the memory image.
    #[error("instruction fetch outside the memory image")]
    FetchOutOfRange,
}

impl HaltCause {
    /// Returns `true` for the intended end-of-program sentinel.
    #[must_use]
    pub const fn is_normal(self) -> bool {
        matches!(self, Self::ZeroWord)
    }

    /// Returns the fault code behind an abnormal halt.
    #[must_use]
    pub const fn fault_code(self) -> Option<FaultCode> {
        match self {
            Self::ZeroWord => None,
            Self::IllegalInstruction { .. } => Some(FaultCode::IllegalInstruction),
            Self::MemoryAccess(exception) => Some(exception.code),
            Self::FetchOutOfRange => Some(FaultCode::FetchOutOfRange),
        }
    }
}
