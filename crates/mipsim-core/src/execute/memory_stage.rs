//! Load/store stage.

use crate::decoder::{DecodedInstruction, RegisterSnapshot};
use crate::encoding::Operation;
use crate::{validate_data_access, FaultCode, MemoryAccessException, MemoryLayout};

/// A data-region word access performed by the memory stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DataAccess {
    /// Effective address.
    pub addr: u32,
    /// Word read or written.
    pub value: u32,
    /// `true` for `sw`.
    pub is_write: bool,
}

/// Result of the memory stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemoryStageOutcome {
    /// Value handed to write-back. `None` for stores.
    pub value: Option<u32>,
    /// The access performed, if any.
    pub access: Option<DataAccess>,
}

impl MemoryStageOutcome {
    /// Address of the word this stage modified, if any.
    #[must_use]
    pub const fn changed_address(&self) -> Option<u32> {
        match self.access {
            Some(DataAccess {
                addr,
                is_write: true,
                ..
            }) => Some(addr),
            _ => None,
        }
    }
}

/// Performs `lw`/`sw` against `memory`; passes `result` through otherwise.
///
/// The effective address is validated before `memory` is touched, so a
/// faulting store leaves the image unchanged.
///
/// # Errors
///
/// Returns a [`MemoryAccessException`] naming `pc` and the effective address
/// when it lies outside the data region or is not word-aligned.
pub fn memory_access(
    instruction: &DecodedInstruction,
    snapshot: &RegisterSnapshot,
    result: u32,
    pc: u32,
    memory: &mut [u32],
    layout: &MemoryLayout,
) -> Result<MemoryStageOutcome, MemoryAccessException> {
    let operation = instruction.operation();
    if !operation.is_memory_access() {
        return Ok(MemoryStageOutcome {
            value: Some(result),
            access: None,
        });
    }

    let addr = result;
    let fault = |code| MemoryAccessException { pc, addr, code };
    let index = validate_data_access(layout, addr).map_err(fault)?;
    let slot = memory
        .get_mut(index)
        .ok_or_else(|| fault(FaultCode::DataAddressOutOfRange))?;

    if operation == Operation::Sw {
        *slot = snapshot.rt;
        Ok(MemoryStageOutcome {
            value: None,
            access: Some(DataAccess {
                addr,
                value: snapshot.rt,
                is_write: true,
            }),
        })
    } else {
        let value = *slot;
        Ok(MemoryStageOutcome {
            value: Some(value),
            access: Some(DataAccess {
                addr,
                value,
                is_write: false,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{encode_immediate, encode_register};
    use crate::{new_memory_image, read_word, Decoder};
    use rstest::rstest;

    const PC: u32 = 0x0040_0008;

    fn decode(word: u32) -> DecodedInstruction {
        Decoder::decode_fields(word, PC).expect("should decode")
    }

    #[test]
    fn non_memory_instruction_passes_result_through() {
        let layout = MemoryLayout::default();
        let mut memory = new_memory_image(&layout);
        let addu = decode(encode_register(1, 2, 3, 0, 0x21));
        let outcome = memory_access(
            &addu,
            &RegisterSnapshot::default(),
            42,
            PC,
            &mut memory,
            &layout,
        )
        .expect("no access");
        assert_eq!(
            outcome,
            MemoryStageOutcome {
                value: Some(42),
                access: None
            }
        );
        assert_eq!(outcome.changed_address(), None);
    }

    #[test]
    fn store_then_load_round_trips() {
        let layout = MemoryLayout::default();
        let mut memory = new_memory_image(&layout);
        let sw = decode(encode_immediate(0x2B, 1, 2, 0));
        let lw = decode(encode_immediate(0x23, 1, 3, 0));
        let snapshot = RegisterSnapshot {
            rs: 0x0040_1010,
            rt: 0xCAFE_F00D,
            rd: 0,
        };

        let stored = memory_access(&sw, &snapshot, 0x0040_1010, PC, &mut memory, &layout)
            .expect("store in range");
        assert_eq!(stored.value, None);
        assert_eq!(stored.changed_address(), Some(0x0040_1010));
        assert_eq!(read_word(&memory, &layout, 0x0040_1010), Some(0xCAFE_F00D));

        let loaded = memory_access(&lw, &snapshot, 0x0040_1010, PC, &mut memory, &layout)
            .expect("load in range");
        assert_eq!(loaded.value, Some(0xCAFE_F00D));
        assert_eq!(loaded.changed_address(), None);
    }

    #[rstest]
    #[case::below_data_region(0x0040_0FFF, FaultCode::DataAddressOutOfRange)]
    #[case::instruction_region(0x0040_0000, FaultCode::DataAddressOutOfRange)]
    #[case::past_end(0x0040_4000, FaultCode::DataAddressOutOfRange)]
    #[case::misaligned(0x0040_1002, FaultCode::UnalignedDataAccess)]
    fn invalid_store_faults_without_mutation(#[case] addr: u32, #[case] code: FaultCode) {
        let layout = MemoryLayout::default();
        let mut memory = new_memory_image(&layout);
        let before = memory.clone();
        let sw = decode(encode_immediate(0x2B, 1, 2, 0));
        let snapshot = RegisterSnapshot {
            rs: addr,
            rt: 0xFFFF_FFFF,
            rd: 0,
        };

        let err = memory_access(&sw, &snapshot, addr, PC, &mut memory, &layout)
            .expect_err("address is illegal");
        assert_eq!(err, MemoryAccessException { pc: PC, addr, code });
        assert_eq!(memory, before);
    }
}
