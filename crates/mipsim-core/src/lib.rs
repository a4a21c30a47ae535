//! Core simulator crate for a 32-bit MIPS-subset machine.
//!
//! The machine has 32 general-purpose registers, a program counter, and a
//! flat word-addressed memory image split into an instruction region and a
//! data region. [`step_one`] runs one fetch/decode/execute/memory/write-back
//! cycle and returns a typed [`StepOutcome`] instead of terminating.

/// Memory model primitives and region geometry.
pub mod memory;
pub use memory::{
    new_memory_image, read_word, validate_data_access, validate_fetch_access,
    validate_word_alignment, write_word, MemoryLayout, MemoryRegion, DATA_WORDS,
    INSTRUCTION_BASE, INSTRUCTION_WORDS, WORD_BYTES,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    ByteOrder, CycleReport, ImmediateExtension, MachineConfig, MachineState, NullTraceSink,
    RunOutcome, StepOutcome, TraceEvent, TraceSink,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{ArchitecturalState, Register, RunState, GENERAL_REGISTER_COUNT, REGISTER_NAMES};

/// Opcode and function-code tables, field extraction, and encoders.
pub mod encoding;
pub use encoding::{
    classify_operation, Format, Function, ImmediateOpcode, JumpOpcode, OpcodeClass, Operation,
    OPERATION_TABLE,
};

/// Instruction decoder with register snapshotting.
pub mod decoder;
pub use decoder::{DecodeHalt, DecodedInstruction, Decoder, RegisterSnapshot};

/// Fault taxonomy and halt causes.
pub mod fault;
pub use fault::{FaultClass, FaultCode, HaltCause, MemoryAccessException};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    execute, memory_access, run, step_one, update_pc, write_back, DataAccess,
    MemoryStageOutcome, PcUpdate,
};

/// Program image loading.
pub mod loader;
pub use loader::{load_bytes, load_file, load_reader, load_words, words_from_bytes, LoadError};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{
    disassemble_one, disassemble_range, disassemble_window, disassemble_word, format_instruction,
    format_operands, DisassemblyRow,
};

#[cfg(test)]
use proptest as _;
