//! Address legality policy for instruction fetch and data access.

use crate::{FaultCode, MemoryLayout, MemoryRegion, WORD_BYTES};

/// Validates that `addr` is a multiple of the word width.
///
/// # Errors
///
/// Returns [`FaultCode::UnalignedDataAccess`] when `addr` is not 4-byte aligned.
pub const fn validate_word_alignment(addr: u32) -> Result<(), FaultCode> {
    if addr % WORD_BYTES == 0 {
        Ok(())
    } else {
        Err(FaultCode::UnalignedDataAccess)
    }
}

/// Validates a load/store effective address and returns its backing index.
///
/// Only aligned addresses inside `[data_base, data_base + data_size)` are
/// legal. The range rule is checked before alignment.
///
/// # Errors
///
/// Returns [`FaultCode::DataAddressOutOfRange`] outside the data region and
/// [`FaultCode::UnalignedDataAccess`] for misaligned data-region addresses.
pub const fn validate_data_access(layout: &MemoryLayout, addr: u32) -> Result<usize, FaultCode> {
    if !matches!(layout.region(addr), MemoryRegion::Data) {
        return Err(FaultCode::DataAddressOutOfRange);
    }
    if let Err(code) = validate_word_alignment(addr) {
        return Err(code);
    }
    match layout.word_index(addr) {
        Some(index) => Ok(index),
        None => Err(FaultCode::DataAddressOutOfRange),
    }
}

/// Validates an instruction fetch address and returns its backing index.
///
/// Fetch may read any aligned word of the image, data region included.
///
/// # Errors
///
/// Returns [`FaultCode::FetchOutOfRange`] for misaligned or unmapped addresses.
pub const fn validate_fetch_access(layout: &MemoryLayout, addr: u32) -> Result<usize, FaultCode> {
    match layout.word_index(addr) {
        Some(index) => Ok(index),
        None => Err(FaultCode::FetchOutOfRange),
    }
}
