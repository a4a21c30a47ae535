//! Runs a fixed program and prints an FNV-1a fingerprint of the final machine.
//!
//! Two hosts producing the same fingerprint executed the program identically.

use mipsim_core::encoding::{encode_immediate, encode_jump, encode_register};
use mipsim_core::{
    load_words, run, MachineConfig, MachineState, StepOutcome, TraceEvent, TraceSink,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

/// Sums 10..1 in a loop, stores the sum through a `jal`/`jr` call, reloads it.
fn program() -> Vec<u32> {
    vec![
        encode_immediate(0x09, 0, 8, 10),      // addiu $8, $0, 10
        encode_immediate(0x09, 0, 9, 0),       // addiu $9, $0, 0
        encode_register(9, 8, 9, 0, 0x21),     // loop: addu $9, $9, $8
        encode_immediate(0x09, 8, 8, 0xFFFF),  // addiu $8, $8, -1
        encode_immediate(0x05, 8, 0, 0xFFFD),  // bne $8, $0, loop
        encode_jump(0x03, 0x0010_0008),        // jal store
        encode_immediate(0x23, 29, 10, 0xFFFC), // lw $10, -4($29)
        0,                                     // halt
        encode_immediate(0x2B, 29, 9, 0xFFFC), // store: sw $9, -4($29)
        encode_register(31, 0, 0, 0, 0x08),    // jr $31
    ]
}

struct Fnv(u64);

impl Fnv {
    fn bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(0x1000_0000_01B3);
        }
    }

    fn word(&mut self, word: u32) {
        self.bytes(&word.to_le_bytes());
    }
}

impl TraceSink for Fnv {
    fn on_event(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::InstructionStart { pc, word } => {
                self.bytes(&[0x10]);
                self.word(pc);
                self.word(word);
            }
            TraceEvent::MemoryAccess {
                addr,
                value,
                is_write,
            } => {
                self.bytes(&[0x11, u8::from(is_write)]);
                self.word(addr);
                self.word(value);
            }
            TraceEvent::InstructionRetired { pc, next_pc } => {
                self.bytes(&[0x12]);
                self.word(pc);
                self.word(next_pc);
            }
            TraceEvent::Halted { pc, cause } => {
                self.bytes(&[0x13, cause.fault_code().map_or(0, |code| code.as_u8())]);
                self.word(pc);
            }
        }
    }
}

fn fingerprint() -> Result<String, mipsim_core::LoadError> {
    let config = MachineConfig {
        tracing_enabled: true,
        ..MachineConfig::default()
    };
    let mut state = MachineState::new(&config);
    load_words(&mut state, &program())?;

    let mut hash = Fnv(0xcbf2_9ce4_8422_2325);
    let outcome = run(&mut state, &config, &mut hash, 1_000);

    hash.bytes(&outcome.steps.to_le_bytes());
    if let Some(StepOutcome::Halted(cause)) = outcome.final_step {
        hash.bytes(&[u8::from(cause.is_normal())]);
    }
    for value in state.arch.gprs() {
        hash.word(*value);
    }
    hash.word(state.arch.pc());
    for value in state.memory.iter() {
        hash.word(*value);
    }

    Ok(format!("{:016x}", hash.0))
}

fn main() {
    match fingerprint() {
        Ok(fingerprint) => println!("{fingerprint}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
