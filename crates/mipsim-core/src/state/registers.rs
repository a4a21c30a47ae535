use std::fmt;

/// Number of architecturally visible general-purpose registers (`$0..$31`).
pub const GENERAL_REGISTER_COUNT: usize = 32;

/// Conventional assembler names, indexed by register number.
pub const REGISTER_NAMES: [&str; GENERAL_REGISTER_COUNT] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", "$t0", "$t1", "$t2", "$t3", "$t4",
    "$t5", "$t6", "$t7", "$s0", "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7", "$t8", "$t9",
    "$k0", "$k1", "$gp", "$sp", "$fp", "$ra",
];

/// General-purpose register identifier, always in `0..32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Register(u8);

impl Register {
    /// Register 0. Not hardwired unless the machine is configured so.
    pub const ZERO: Self = Self(0);
    /// Stack pointer, seeded at reset.
    pub const SP: Self = Self(29);
    /// Link register written by `jal`.
    pub const RA: Self = Self(31);

    /// Creates a register from its number, rejecting values above 31.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < GENERAL_REGISTER_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Builds a register from a 5-bit instruction field (upper bits ignored).
    #[must_use]
    pub const fn from_field(bits: u32) -> Self {
        Self((bits & 0x1F) as u8)
    }

    /// Returns the array index for this register (`0..=31`).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the register number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Returns the conventional assembler name (`$sp`, `$ra`, ...).
    #[must_use]
    pub const fn abi_name(self) -> &'static str {
        REGISTER_NAMES[self.0 as usize]
    }

    /// Iterates all registers in numeric order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..GENERAL_REGISTER_COUNT as u8).map(Self)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Architectural register state: the register file and the program counter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    gpr: [u32; GENERAL_REGISTER_COUNT],
    pc: u32,
}

impl ArchitecturalState {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: Register) -> u32 {
        self.gpr[reg.index()]
    }

    /// Reads a general-purpose register as a signed value.
    #[must_use]
    pub const fn gpr_signed(&self, reg: Register) -> i32 {
        self.gpr[reg.index()] as i32
    }

    /// Writes a general-purpose register.
    pub fn set_gpr(&mut self, reg: Register, value: u32) {
        self.gpr[reg.index()] = value;
    }

    /// Returns the full register file in numeric order.
    #[must_use]
    pub const fn gprs(&self) -> &[u32; GENERAL_REGISTER_COUNT] {
        &self.gpr
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Writes the program counter.
    pub fn set_pc(&mut self, value: u32) {
        self.pc = value;
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchitecturalState, Register, GENERAL_REGISTER_COUNT};

    #[test]
    fn register_constructor_rejects_out_of_range() {
        assert_eq!(Register::new(0), Some(Register::ZERO));
        assert_eq!(Register::new(31), Some(Register::RA));
        assert_eq!(Register::new(32), None);
    }

    #[test]
    fn field_decode_masks_to_five_bits() {
        assert_eq!(Register::from_field(0x3F), Register::RA);
        assert_eq!(Register::from_field(29).index(), 29);
    }

    #[test]
    fn names_and_display() {
        assert_eq!(Register::SP.abi_name(), "$sp");
        assert_eq!(Register::RA.abi_name(), "$ra");
        assert_eq!(Register::SP.to_string(), "$29");
        assert_eq!(Register::all().count(), GENERAL_REGISTER_COUNT);
    }

    #[test]
    fn default_state_is_zeroed() {
        let state = ArchitecturalState::default();
        assert_eq!(state.pc(), 0);
        assert!(state.gprs().iter().all(|value| *value == 0));
    }

    #[test]
    fn register_zero_is_an_ordinary_storage_cell() {
        let mut state = ArchitecturalState::default();
        state.set_gpr(Register::ZERO, 7);
        assert_eq!(state.gpr(Register::ZERO), 7);
    }

    #[test]
    fn signed_view_reinterprets_bits() {
        let mut state = ArchitecturalState::default();
        state.set_gpr(Register::from_field(5), 0xFFFF_FFFF);
        assert_eq!(state.gpr_signed(Register::from_field(5)), -1);
    }
}
