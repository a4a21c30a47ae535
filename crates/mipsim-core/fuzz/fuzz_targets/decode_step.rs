#![no_main]

use libfuzzer_sys::fuzz_target;
use mipsim_core::{
    load_bytes, run, validate_data_access, validate_fetch_access, ByteOrder, Decoder,
    MachineConfig, MachineState, MemoryLayout, StepOutcome,
};

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let word = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let addr = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    if let Ok(decoded) = Decoder::decode_fields(word, 0x0040_0000) {
        assert_eq!(decoded.encode(), word);
    }

    let layout = MemoryLayout::default();
    let _ = validate_fetch_access(&layout, addr);
    let _ = validate_data_access(&layout, addr);

    let config = MachineConfig {
        hardwired_zero: data[0] & 1 == 1,
        tracing_enabled: true,
        ..MachineConfig::default()
    };
    let mut state = MachineState::new(&config);
    let image = &data[..data.len() - data.len() % 4];
    if load_bytes(&mut state, image, ByteOrder::Little).is_err() {
        return;
    }

    let mut events = Vec::new();
    let outcome = run(&mut state, &config, &mut events, 4096);
    if let Some(StepOutcome::Halted(cause)) = outcome.final_step {
        assert_eq!(state.halt_cause(), Some(cause));
    }
});
