//! Per-cycle text reporting.

use std::io::{self, Write};

use mipsim_core::{
    format_instruction, ArchitecturalState, CycleReport, Decoder, HaltCause, MachineState,
    Register,
};

/// Which state dumps follow each retired cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Print the whole register file instead of the changed register.
    pub print_registers: bool,
    /// Print all non-zero data words instead of the changed word.
    pub print_memory: bool,
}

/// Writes the line announcing the word about to execute.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_cycle_header(out: &mut impl Write, pc: u32, word: u32) -> io::Result<()> {
    writeln!(out, "Executing instruction at {pc:08x}: {word:08x}")
}

/// Writes the disassembly of `word`; writes nothing for undecodable words.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_instruction(out: &mut impl Write, pc: u32, word: u32) -> io::Result<()> {
    match Decoder::decode_fields(word, pc) {
        Ok(instruction) => writeln!(out, "{}", format_instruction(&instruction, pc)),
        Err(_) => Ok(()),
    }
}

/// Writes the new PC, then the register and memory effects of `report`.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_cycle_info(
    out: &mut impl Write,
    report: &CycleReport,
    state: &MachineState,
    options: ReportOptions,
) -> io::Result<()> {
    writeln!(out, "New pc = {:08x}", report.next_pc)?;

    if options.print_registers {
        write_registers(out, &state.arch)?;
    } else if let Some(reg) = report.changed_register {
        writeln!(
            out,
            "Updated r{:02} to {:08x}",
            reg.number(),
            state.arch.gpr(reg)
        )?;
    } else {
        writeln!(out, "No register was updated.")?;
    }

    if options.print_memory {
        write_nonzero_memory(out, state)
    } else if let Some(addr) = report.changed_memory {
        writeln!(
            out,
            "Updated memory at address {addr:08x} to {:08x}",
            state.word(addr).unwrap_or_default()
        )
    } else {
        writeln!(out, "No memory location was updated.")
    }
}

/// Writes all 32 registers, four per line.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_registers(out: &mut impl Write, arch: &ArchitecturalState) -> io::Result<()> {
    for reg in Register::all() {
        write!(out, "r{:02}: {:08x}  ", reg.number(), arch.gpr(reg))?;
        if (reg.index() + 1) % 4 == 0 {
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Writes every non-zero word of the data region.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_nonzero_memory(out: &mut impl Write, state: &MachineState) -> io::Result<()> {
    writeln!(out, "Nonzero memory")?;
    writeln!(out, "ADDR\t  CONTENTS")?;
    for (addr, value) in state.nonzero_data_words() {
        writeln!(out, "{addr:08x}  {value:08x}")?;
    }
    Ok(())
}

/// Writes the diagnostic for an abnormal halt. The zero-word sentinel is silent.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_halt(out: &mut impl Write, pc: u32, cause: HaltCause) -> io::Result<()> {
    match cause {
        HaltCause::ZeroWord => Ok(()),
        HaltCause::MemoryAccess(exception) => writeln!(out, "{exception}"),
        HaltCause::IllegalInstruction { word } => {
            writeln!(out, "Illegal instruction at 0x{pc:08x}: 0x{word:08x}")
        }
        HaltCause::FetchOutOfRange => {
            writeln!(out, "Instruction fetch out of range at 0x{pc:08x}")
        }
    }
}
