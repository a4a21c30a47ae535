//! Helper functions for instruction execution.

#![allow(clippy::cast_sign_loss)]

use crate::ImmediateExtension;

/// Widens a decoded (sign-extended) immediate for `andi`/`ori` under `policy`.
#[must_use]
pub const fn extend_logical_immediate(immediate: i32, policy: ImmediateExtension) -> u32 {
    match policy {
        ImmediateExtension::ZeroExtend => (immediate as u32) & 0xFFFF,
        ImmediateExtension::SignExtend => immediate as u32,
    }
}

/// Computes `base + immediate` modulo 2^32.
#[must_use]
pub const fn compute_effective_address(base: u32, immediate: i32) -> u32 {
    base.wrapping_add(immediate as u32)
}

/// Converts a branch immediate into its byte offset (`immediate << 2`).
#[must_use]
pub const fn branch_offset(immediate: i32) -> u32 {
    (immediate as u32).wrapping_shl(2)
}

/// Signed comparison evaluated through the sign of `lhs - rhs`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn set_less_than(lhs: u32, rhs: u32) -> u32 {
    ((lhs.wrapping_sub(rhs) as i32) < 0) as u32
}
