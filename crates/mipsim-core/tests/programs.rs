//! Whole-program runs from a loaded image to a halt.

use mipsim_core::encoding::{encode_immediate, encode_jump, encode_register};
use mipsim_core::{
    disassemble_range, load_bytes, load_words, run, step_one, ByteOrder, HaltCause,
    ImmediateExtension, MachineConfig, MachineState, MemoryLayout, NullTraceSink, Register,
    RunOutcome, StepOutcome,
};
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

fn r(n: u32) -> Register {
    Register::from_field(n)
}

/// Sums 10..1, stores the sum through a `jal`/`jr` call, then reloads it.
fn sum_program() -> Vec<u32> {
    vec![
        encode_immediate(0x09, 0, 8, 10),
        encode_immediate(0x09, 0, 9, 0),
        encode_register(9, 8, 9, 0, 0x21),
        encode_immediate(0x09, 8, 8, 0xFFFF),
        encode_immediate(0x05, 8, 0, 0xFFFD),
        encode_jump(0x03, 0x0010_0008),
        encode_immediate(0x23, 29, 10, 0xFFFC),
        0,
        encode_immediate(0x2B, 29, 9, 0xFFFC),
        encode_register(31, 0, 0, 0, 0x08),
    ]
}

fn run_program(program: &[u32], config: &MachineConfig) -> (MachineState, RunOutcome) {
    let mut state = MachineState::new(config);
    load_words(&mut state, program).expect("program fits");
    let outcome = run(&mut state, config, &mut NullTraceSink, 10_000);
    (state, outcome)
}

#[test]
fn loop_and_call_program_runs_to_sentinel() {
    let (state, outcome) = run_program(&sum_program(), &MachineConfig::default());

    assert_eq!(outcome.halt_cause(), Some(HaltCause::ZeroWord));
    // 2 setup + 10 * 3 loop + jal + sw + jr + lw
    assert_eq!(outcome.steps, 36);
    assert_eq!(state.retired, 36);
    assert_eq!(state.arch.gpr(r(9)), 55);
    assert_eq!(state.arch.gpr(r(10)), 55);
    assert_eq!(state.arch.gpr(r(8)), 0);
    assert_eq!(state.arch.gpr(Register::RA), 0x0040_0018);
    assert_eq!(state.arch.gpr(Register::SP), 0x0040_4000);
    assert_eq!(state.arch.pc(), 0x0040_001C);
    assert_eq!(state.word(0x0040_3FFC), Some(55));
    assert_eq!(
        state.nonzero_data_words().collect::<Vec<_>>(),
        vec![(0x0040_3FFC, 55)]
    );
}

#[test]
fn byte_image_matches_word_image() {
    let program = sum_program();
    let bytes: Vec<u8> = program
        .iter()
        .flat_map(|word| ByteOrder::Big.word_to_bytes(*word))
        .collect();

    let config = MachineConfig {
        byte_order: ByteOrder::Big,
        ..MachineConfig::default()
    };
    let mut state = MachineState::new(&config);
    load_bytes(&mut state, &bytes, config.byte_order).expect("fits");
    let outcome = run(&mut state, &config, &mut NullTraceSink, 10_000);

    assert_eq!(outcome.steps, 36);
    assert_eq!(state.arch.gpr(r(10)), 55);
}

#[test]
fn lui_ori_builds_data_address() {
    // lui $1, 0x0040 ; ori $1, $1, 0x1000 ; addiu $2, $0, 77 ; sw $2, 0($1) ; lw $3, 0($1)
    let program = [
        encode_immediate(0x0F, 0, 1, 0x0040),
        encode_immediate(0x0D, 1, 1, 0x1000),
        encode_immediate(0x09, 0, 2, 77),
        encode_immediate(0x2B, 1, 2, 0),
        encode_immediate(0x23, 1, 3, 0),
    ];
    let (state, outcome) = run_program(&program, &MachineConfig::default());
    assert_eq!(outcome.halt_cause(), Some(HaltCause::ZeroWord));
    assert_eq!(state.arch.gpr(r(1)), 0x0040_1000);
    assert_eq!(state.arch.gpr(r(3)), 77);
    assert_eq!(state.word(0x0040_1000), Some(77));
}

#[rstest]
#[case::zero_extend(ImmediateExtension::ZeroExtend, 0x0000_8000)]
#[case::sign_extend(ImmediateExtension::SignExtend, 0xFFFF_8000)]
fn logical_immediate_policy_is_configurable(
    #[case] policy: ImmediateExtension,
    #[case] expected: u32,
) {
    let config = MachineConfig {
        logical_immediate: policy,
        ..MachineConfig::default()
    };
    let (state, _) = run_program(&[encode_immediate(0x0D, 0, 4, 0x8000)], &config);
    assert_eq!(state.arch.gpr(r(4)), expected);
}

#[rstest]
#[case::ordinary_register(false, 9)]
#[case::hardwired(true, 0)]
fn register_zero_policy_is_configurable(#[case] hardwired_zero: bool, #[case] expected: u32) {
    let config = MachineConfig {
        hardwired_zero,
        ..MachineConfig::default()
    };
    // addiu $0, $0, 9 ; addu $5, $0, $0
    let program = [
        encode_immediate(0x09, 0, 0, 9),
        encode_register(0, 0, 5, 0, 0x21),
    ];
    let (state, _) = run_program(&program, &config);
    assert_eq!(state.arch.gpr(Register::ZERO), expected);
    assert_eq!(state.arch.gpr(r(5)), expected * 2);
}

#[test]
fn fault_mid_program_preserves_prior_effects() {
    // addiu $8, $0, 1 ; sw $8, 0($0) ; addiu $8, $0, 2
    let program = [
        encode_immediate(0x09, 0, 8, 1),
        encode_immediate(0x2B, 0, 8, 0),
        encode_immediate(0x09, 0, 8, 2),
    ];
    let (mut state, outcome) = run_program(&program, &MachineConfig::default());

    assert_eq!(outcome.steps, 1);
    let Some(HaltCause::MemoryAccess(exception)) = outcome.halt_cause() else {
        panic!("expected a memory fault, got {outcome:?}");
    };
    assert_eq!(exception.pc, 0x0040_0004);
    assert_eq!(exception.addr, 0);
    assert_eq!(state.arch.gpr(r(8)), 1);
    assert_eq!(state.arch.pc(), 0x0040_0004);

    // Latched: further steps report the same cause.
    let again = step_one(&mut state, &MachineConfig::default(), &mut NullTraceSink);
    assert_eq!(again, StepOutcome::Halted(HaltCause::MemoryAccess(exception)));
}

#[test]
fn running_off_the_image_is_a_fetch_fault() {
    // A tiny layout filled with `addiu $8, $8, 1` runs into the unmapped end.
    let layout = MemoryLayout::new(0x1000, 4, 2).expect("valid layout");
    let config = MachineConfig {
        layout,
        ..MachineConfig::default()
    };
    let mut state = MachineState::new(&config);
    load_words(&mut state, &[encode_immediate(0x09, 8, 8, 1); 4]).expect("fits");
    state.memory[4] = encode_immediate(0x09, 8, 8, 1);
    state.memory[5] = encode_immediate(0x09, 8, 8, 1);

    let outcome = run(&mut state, &config, &mut NullTraceSink, 100);
    assert_eq!(outcome.steps, 6);
    assert_eq!(outcome.halt_cause(), Some(HaltCause::FetchOutOfRange));
    assert_eq!(state.arch.gpr(r(8)), 6);
    assert_eq!(state.arch.pc(), 0x1018);
}

#[test]
fn listing_covers_the_loaded_program() {
    let mut state = MachineState::default();
    load_words(&mut state, &sum_program()).expect("fits");
    let lines: Vec<String> = disassemble_range(&state, 0x0040_0000, 10)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lines,
        vec![
            "addiu\t$8, $0, 10",
            "addiu\t$9, $0, 0",
            "addu\t$9, $9, $8",
            "addiu\t$8, $8, -1",
            "bne\t$8, $0, 0x00400008",
            "jal\t0x00400020",
            "lw\t$10, -4($29)",
            "halt",
            "sw\t$9, -4($29)",
            "jr\t$31",
        ]
    );
}
