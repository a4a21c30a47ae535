//! Batch and interactive stepping sessions.

use std::io::{self, BufRead, Write};

use mipsim_core::{
    disassemble_range, step_one, HaltCause, MachineConfig, MachineState, NullTraceSink,
    StepOutcome,
};
use tracing::{debug, info};

use crate::report::{
    write_cycle_header, write_cycle_info, write_halt, write_instruction, ReportOptions,
};

/// How a session drives the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    /// What each cycle report includes.
    pub report: ReportOptions,
    /// Prompt with `> ` before every cycle.
    pub interactive: bool,
    /// Stop after this many cycles.
    pub max_steps: Option<u64>,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The machine halted.
    Halted(HaltCause),
    /// The user answered the prompt with `q`, or input ended.
    Quit,
    /// The configured step limit was reached.
    StepLimit,
}

impl SessionEnd {
    /// Process exit status for this ending.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Halted(cause) => {
                if cause.is_normal() {
                    0
                } else {
                    1
                }
            }
            Self::Quit | Self::StepLimit => 0,
        }
    }
}

/// Runs cycles until the machine halts, the user quits, or the step limit hits.
///
/// `input` is only read in interactive mode.
///
/// # Errors
///
/// Propagates read and write failures.
pub fn run_session(
    state: &mut MachineState,
    config: &MachineConfig,
    options: SessionOptions,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<SessionEnd> {
    let mut steps = 0u64;
    let mut line = String::new();

    let end = loop {
        if options.max_steps.is_some_and(|limit| steps >= limit) {
            break SessionEnd::StepLimit;
        }

        if options.interactive {
            write!(out, "> ")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 || line.starts_with('q') {
                break SessionEnd::Quit;
            }
        }

        let pc = state.arch.pc();
        if let Some(word) = state.fetch(pc) {
            write_cycle_header(out, pc, word)?;
            write_instruction(out, pc, word)?;
        }

        match step_one(state, config, &mut NullTraceSink) {
            StepOutcome::Retired(report) => {
                steps += 1;
                write_cycle_info(out, &report, state, options.report)?;
            }
            StepOutcome::Halted(cause) => {
                write_halt(out, pc, cause)?;
                break SessionEnd::Halted(cause);
            }
        }
    };

    out.flush()?;
    info!("session ended after {steps} cycles: {end:?}");
    Ok(end)
}

/// Writes a listing of the first `count` words of the instruction region.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_listing(state: &MachineState, count: usize, out: &mut impl Write) -> io::Result<()> {
    let rows = disassemble_range(state, state.layout.instruction_base(), count);
    debug!("listing {} words", rows.len());
    for row in rows {
        writeln!(out, "{:08x}: {:08x}  {row}", row.addr, row.word)?;
    }
    Ok(())
}
