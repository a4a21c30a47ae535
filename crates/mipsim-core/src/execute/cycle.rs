//! Instruction-cycle orchestration.

use tracing::{debug, trace, warn};

use super::{execute, memory_access, update_pc, write_back};
use crate::state::{Register, RunState};
use crate::{
    CycleReport, Decoder, HaltCause, MachineConfig, MachineState, RunOutcome, StepOutcome,
    TraceEvent, TraceSink,
};

/// Runs one full instruction cycle.
///
/// A halted machine stays halted: the latched cause is returned again and
/// nothing is mutated. A cycle that halts commits none of its effects.
pub fn step_one(
    state: &mut MachineState,
    config: &MachineConfig,
    sink: &mut dyn TraceSink,
) -> StepOutcome {
    if let RunState::Halted(cause) = state.run_state {
        return StepOutcome::Halted(cause);
    }

    let pc = state.arch.pc();
    let Some(word) = state.fetch(pc) else {
        return halt(state, config, sink, pc, HaltCause::FetchOutOfRange);
    };
    trace!("fetch {pc:08x}: {word:08x}");
    if config.tracing_enabled {
        sink.on_event(TraceEvent::InstructionStart { pc, word });
    }

    let (instruction, snapshot) = match Decoder::decode(word, &state.arch) {
        Ok(decoded) => decoded,
        Err(halt_signal) => return halt(state, config, sink, pc, halt_signal.into()),
    };

    let result = execute(&instruction, &snapshot, pc, config.logical_immediate);
    let pc_update = update_pc(&instruction, result, pc);

    let memory_outcome = match memory_access(
        &instruction,
        &snapshot,
        result,
        pc,
        &mut state.memory,
        &state.layout,
    ) {
        Ok(outcome) => outcome,
        Err(exception) => return halt(state, config, sink, pc, exception.into()),
    };

    pc_update.commit(&mut state.arch);
    let changed_register = write_back(
        &instruction,
        memory_outcome.value,
        &mut state.arch,
        config.hardwired_zero,
    );
    state.retired += 1;

    if config.tracing_enabled {
        if let Some(access) = memory_outcome.access {
            sink.on_event(TraceEvent::MemoryAccess {
                addr: access.addr,
                value: access.value,
                is_write: access.is_write,
            });
        }
        sink.on_event(TraceEvent::InstructionRetired {
            pc,
            next_pc: pc_update.next_pc,
        });
    }

    let report = CycleReport {
        pc,
        word,
        instruction,
        next_pc: pc_update.next_pc,
        changed_register,
        changed_memory: memory_outcome.changed_address(),
    };
    debug!(
        "retired {} at {pc:08x}, next pc {:08x}, register {:?}, memory {:?}",
        instruction.operation().mnemonic(),
        report.next_pc,
        report.changed_register.map(Register::number),
        report.changed_memory,
    );

    StepOutcome::Retired(report)
}

fn halt(
    state: &mut MachineState,
    config: &MachineConfig,
    sink: &mut dyn TraceSink,
    pc: u32,
    cause: HaltCause,
) -> StepOutcome {
    if cause.is_normal() {
        debug!("halt sentinel reached at {pc:08x}");
    } else {
        warn!("machine halted at {pc:08x}: {cause}");
    }
    if config.tracing_enabled {
        sink.on_event(TraceEvent::Halted { pc, cause });
    }
    state.run_state = RunState::Halted(cause);
    StepOutcome::Halted(cause)
}

/// Steps until the machine halts or `max_steps` cycles have been attempted.
pub fn run(
    state: &mut MachineState,
    config: &MachineConfig,
    sink: &mut dyn TraceSink,
    max_steps: u64,
) -> RunOutcome {
    let mut steps = 0;
    let mut final_step = None;

    for _ in 0..max_steps {
        let outcome = step_one(state, config, sink);
        final_step = Some(outcome);
        match outcome {
            StepOutcome::Retired(_) => steps += 1,
            StepOutcome::Halted(_) => break,
        }
    }

    RunOutcome { steps, final_step }
}
