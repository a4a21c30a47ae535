//! Memory model primitives: region geometry, access policy, backing store.

/// Fetch/load/store legality policy helpers.
pub mod access;
/// Region geometry and address decoder.
pub mod map;

pub use access::{validate_data_access, validate_fetch_access, validate_word_alignment};
pub use map::{
    MemoryLayout, MemoryRegion, DATA_WORDS, INSTRUCTION_BASE, INSTRUCTION_WORDS, WORD_BYTES,
};

/// Allocates a zeroed word-addressed backing store for `layout`.
#[must_use]
pub fn new_memory_image(layout: &MemoryLayout) -> Box<[u32]> {
    vec![0; layout.total_words()].into_boxed_slice()
}

/// Reads the word at `addr`, or `None` when `addr` is not an aligned image address.
#[must_use]
pub fn read_word(memory: &[u32], layout: &MemoryLayout, addr: u32) -> Option<u32> {
    layout
        .word_index(addr)
        .and_then(|index| memory.get(index).copied())
}

/// Writes the word at `addr`; returns `false` when `addr` is not an aligned image address.
pub fn write_word(memory: &mut [u32], layout: &MemoryLayout, addr: u32, value: u32) -> bool {
    match layout.word_index(addr).and_then(|index| memory.get_mut(index)) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}
