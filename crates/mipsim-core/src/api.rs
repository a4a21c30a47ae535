//! Public host-facing API contracts for embedding the simulator core.

use crate::decoder::DecodedInstruction;
use crate::memory::{new_memory_image, read_word};
use crate::state::{ArchitecturalState, Register, RunState};
use crate::{HaltCause, MemoryLayout, MemoryRegion};

/// Extension applied to the 16-bit immediate of `andi` and `ori`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ImmediateExtension {
    /// Upper 16 bits are zero (conventional MIPS logical immediates).
    #[default]
    ZeroExtend,
    /// Bit 15 is replicated into the upper 16 bits.
    SignExtend,
}

/// Byte order of the 32-bit words inside a program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ByteOrder {
    /// Least-significant byte first.
    #[default]
    Little,
    /// Most-significant byte first.
    Big,
}

impl ByteOrder {
    /// Assembles one word from four image bytes.
    #[must_use]
    pub const fn word_from_bytes(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }

    /// Splits one word into four image bytes.
    #[must_use]
    pub const fn word_to_bytes(self, word: u32) -> [u8; 4] {
        match self {
            Self::Little => word.to_le_bytes(),
            Self::Big => word.to_be_bytes(),
        }
    }
}

/// Top-level configuration for a machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Region geometry of the memory image.
    pub layout: MemoryLayout,
    /// Extension policy for `andi`/`ori` immediates.
    pub logical_immediate: ImmediateExtension,
    /// Discard writes to `$0` when set.
    pub hardwired_zero: bool,
    /// Word byte order used by the program loader.
    pub byte_order: ByteOrder,
    /// Enables [`TraceEvent`] dispatch to the caller's [`TraceSink`].
    pub tracing_enabled: bool,
}

/// Complete simulated machine: registers, PC, memory image, run state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineState {
    /// Register file and program counter.
    pub arch: ArchitecturalState,
    /// Word-addressed image covering the instruction and data regions.
    pub memory: Box<[u32]>,
    /// Geometry backing `memory`. Authoritative over the config's layout.
    pub layout: MemoryLayout,
    /// Running, or halted with a latched cause.
    pub run_state: RunState,
    /// Number of instructions retired since creation or reset.
    pub retired: u64,
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new(&MachineConfig::default())
    }
}

impl MachineState {
    /// Creates a zeroed machine with `$sp` at the top of the image and PC at
    /// the instruction base.
    #[must_use]
    pub fn new(config: &MachineConfig) -> Self {
        let layout = config.layout;
        let mut state = Self {
            arch: ArchitecturalState::default(),
            memory: new_memory_image(&layout),
            layout,
            run_state: RunState::Running,
            retired: 0,
        };
        state.seed_registers();
        state
    }

    fn seed_registers(&mut self) {
        self.arch = ArchitecturalState::default();
        self.arch.set_gpr(Register::SP, self.layout.stack_top());
        self.arch.set_pc(self.layout.instruction_base());
    }

    /// Restores the reset register state and clears the halt latch.
    ///
    /// The memory image, including any loaded program, is preserved.
    pub fn reset(&mut self) {
        self.seed_registers();
        self.run_state = RunState::Running;
        self.retired = 0;
    }

    /// Reads the instruction word at `pc`.
    ///
    /// Any aligned word of the image is fetchable, data region included.
    #[must_use]
    pub fn fetch(&self, pc: u32) -> Option<u32> {
        read_word(&self.memory, &self.layout, pc)
    }

    /// Reads the word at `addr`, or `None` outside the image.
    #[must_use]
    pub fn word(&self, addr: u32) -> Option<u32> {
        read_word(&self.memory, &self.layout, addr)
    }

    /// Iterates `(address, value)` for every non-zero word of the data region.
    pub fn nonzero_data_words(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let layout = self.layout;
        self.memory
            .iter()
            .enumerate()
            .map(move |(index, value)| (layout.address_of(index), *value))
            .filter(move |(addr, value)| {
                *value != 0 && matches!(layout.region(*addr), MemoryRegion::Data)
            })
    }

    /// Returns the latched halt cause, if halted.
    #[must_use]
    pub const fn halt_cause(&self) -> Option<HaltCause> {
        self.run_state.halt_cause()
    }

    /// Returns `true` once a cycle has halted the machine.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self.run_state, RunState::Halted(_))
    }
}

/// Side effects of one retired instruction, for per-cycle reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CycleReport {
    /// Address the instruction was fetched from.
    pub pc: u32,
    /// Raw instruction word.
    pub word: u32,
    /// Decoded form of `word`.
    pub instruction: DecodedInstruction,
    /// PC after the cycle.
    pub next_pc: u32,
    /// Register reported by write-back.
    pub changed_register: Option<Register>,
    /// Data address written by a store.
    pub changed_memory: Option<u32>,
}

/// Output status from one instruction-cycle attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StepOutcome {
    /// Instruction retired and its effects were committed.
    Retired(CycleReport),
    /// The machine is halted; nothing from this cycle was committed.
    Halted(HaltCause),
}

impl StepOutcome {
    /// Returns the halt cause, if this step halted.
    #[must_use]
    pub const fn halt_cause(&self) -> Option<HaltCause> {
        match self {
            Self::Halted(cause) => Some(*cause),
            Self::Retired(_) => None,
        }
    }

    /// Returns the cycle report, if this step retired an instruction.
    #[must_use]
    pub const fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Retired(report) => Some(report),
            Self::Halted(_) => None,
        }
    }
}

/// Aggregated outcome from running multiple steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of instructions retired during this run call.
    pub steps: u64,
    /// Last step observed, `None` when the step limit was zero.
    pub final_step: Option<StepOutcome>,
}

impl RunOutcome {
    /// Returns the halt cause when the run stopped by halting.
    #[must_use]
    pub const fn halt_cause(&self) -> Option<HaltCause> {
        match &self.final_step {
            Some(step) => step.halt_cause(),
            None => None,
        }
    }
}

/// Deterministic trace events emitted in cycle order when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEvent {
    /// A word was fetched and is about to be decoded.
    InstructionStart {
        /// Program counter used for this fetch.
        pc: u32,
        /// Raw instruction word.
        word: u32,
    },
    /// A load or store touched the data region.
    MemoryAccess {
        /// Effective address.
        addr: u32,
        /// Word read or written.
        value: u32,
        /// True for stores.
        is_write: bool,
    },
    /// An instruction retired.
    InstructionRetired {
        /// Address of the retired instruction.
        pc: u32,
        /// PC after the cycle.
        next_pc: u32,
    },
    /// The machine halted.
    Halted {
        /// PC of the cycle that halted.
        pc: u32,
        /// Why it halted.
        cause: HaltCause,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FaultCode, MemoryAccessException};

    #[test]
    fn default_config_matches_reference_machine() {
        let config = MachineConfig::default();
        assert_eq!(config.layout, MemoryLayout::default());
        assert_eq!(config.logical_immediate, ImmediateExtension::ZeroExtend);
        assert!(!config.hardwired_zero);
        assert_eq!(config.byte_order, ByteOrder::Little);
        assert!(!config.tracing_enabled);
    }

    #[test]
    fn new_machine_seeds_stack_pointer_and_pc() {
        let state = MachineState::default();
        assert_eq!(state.arch.pc(), 0x0040_0000);
        assert_eq!(state.arch.gpr(Register::SP), 0x0040_4000);
        for reg in Register::all().filter(|reg| *reg != Register::SP) {
            assert_eq!(state.arch.gpr(reg), 0, "{reg} should start at zero");
        }
        assert_eq!(state.memory.len(), 4096);
        assert!(state.memory.iter().all(|word| *word == 0));
        assert_eq!(state.run_state, RunState::Running);
        assert_eq!(state.retired, 0);
    }

    #[test]
    fn reset_clears_latch_but_keeps_memory() {
        let mut state = MachineState::default();
        state.memory[0] = 0x2408_0005;
        state.arch.set_gpr(Register::from_field(8), 5);
        state.arch.set_pc(0x0040_0010);
        state.retired = 4;
        state.run_state = RunState::Halted(HaltCause::ZeroWord);

        state.reset();

        assert_eq!(state.memory[0], 0x2408_0005);
        assert_eq!(state.arch.gpr(Register::from_field(8)), 0);
        assert_eq!(state.arch.pc(), 0x0040_0000);
        assert_eq!(state.retired, 0);
        assert!(!state.is_halted());
    }

    #[test]
    fn fetch_covers_whole_image_only() {
        let mut state = MachineState::default();
        state.memory[1024] = 0xABCD_0123;
        assert_eq!(state.fetch(0x0040_1000), Some(0xABCD_0123));
        assert_eq!(state.fetch(0x0040_4000), None);
        assert_eq!(state.fetch(0x0040_0002), None);
        assert_eq!(state.word(0x003F_FFFC), None);
    }

    #[test]
    fn nonzero_data_words_skip_instruction_region() {
        let mut state = MachineState::default();
        state.memory[0] = 1;
        state.memory[1024] = 2;
        state.memory[4095] = 3;
        let words: Vec<_> = state.nonzero_data_words().collect();
        assert_eq!(words, vec![(0x0040_1000, 2), (0x0040_3FFC, 3)]);
    }

    #[test]
    fn byte_order_assembles_words() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(ByteOrder::Little.word_from_bytes(bytes), 0x0403_0201);
        assert_eq!(ByteOrder::Big.word_from_bytes(bytes), 0x0102_0304);
        assert_eq!(ByteOrder::Big.word_to_bytes(0x0102_0304), bytes);
    }

    #[test]
    fn step_and_run_outcome_accessors() {
        let cause = HaltCause::MemoryAccess(MemoryAccessException {
            pc: 0x0040_0000,
            addr: 1,
            code: FaultCode::DataAddressOutOfRange,
        });
        let step = StepOutcome::Halted(cause);
        assert_eq!(step.halt_cause(), Some(cause));
        assert!(step.report().is_none());

        let run = RunOutcome {
            steps: 3,
            final_step: Some(step),
        };
        assert_eq!(run.halt_cause(), Some(cause));
        assert_eq!(
            RunOutcome {
                steps: 0,
                final_step: None
            }
            .halt_cause(),
            None
        );
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink = Vec::new();
        sink.on_event(TraceEvent::InstructionStart { pc: 0, word: 1 });
        sink.on_event(TraceEvent::Halted {
            pc: 0,
            cause: HaltCause::ZeroWord,
        });
        assert_eq!(sink.len(), 2);
        NullTraceSink.on_event(TraceEvent::InstructionStart { pc: 0, word: 1 });
    }
}
