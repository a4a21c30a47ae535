//! Program image loading.
//!
//! An image is a flat sequence of 32-bit words written in order from the
//! instruction base. It must fit in the instruction region.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::{ByteOrder, MachineState};

/// Failure to place a program image into a machine.
#[derive(Debug, Error)]
pub enum LoadError {
    /// More words than the instruction region holds.
    #[error("program too big: {words} words exceed the {capacity}-word instruction region")]
    ProgramTooLarge {
        /// Words in the image.
        words: usize,
        /// Instruction-region capacity in words.
        capacity: usize,
    },
    /// Image length is not a multiple of four bytes.
    #[error("program image ends with a partial word ({trailing_bytes} trailing bytes)")]
    TruncatedWord {
        /// Bytes past the last whole word.
        trailing_bytes: usize,
    },
    /// Reading the image failed.
    #[error("failed to read program image: {0}")]
    Io(#[from] io::Error),
}

/// Splits an image into words.
///
/// # Errors
///
/// Returns [`LoadError::TruncatedWord`] when `bytes.len()` is not a multiple of 4.
pub fn words_from_bytes(bytes: &[u8], order: ByteOrder) -> Result<Vec<u32>, LoadError> {
    let chunks = bytes.chunks_exact(4);
    let trailing_bytes = chunks.remainder().len();
    if trailing_bytes != 0 {
        return Err(LoadError::TruncatedWord { trailing_bytes });
    }
    Ok(chunks
        .map(|chunk| order.word_from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Writes `words` from the instruction base and returns the word count.
///
/// Words past the image are left untouched, so loading is only meaningful
/// on a fresh or reset machine.
///
/// # Errors
///
/// Returns [`LoadError::ProgramTooLarge`] when `words` exceeds the instruction
/// region; the machine is not modified in that case.
pub fn load_words(state: &mut MachineState, words: &[u32]) -> Result<usize, LoadError> {
    let capacity = state.layout.instruction_words() as usize;
    if words.len() > capacity {
        return Err(LoadError::ProgramTooLarge {
            words: words.len(),
            capacity,
        });
    }
    state.memory[..words.len()].copy_from_slice(words);
    info!(
        "loaded {} words at {:08x}",
        words.len(),
        state.layout.instruction_base()
    );
    Ok(words.len())
}

/// Loads a byte image.
///
/// # Errors
///
/// See [`words_from_bytes`] and [`load_words`].
pub fn load_bytes(
    state: &mut MachineState,
    bytes: &[u8],
    order: ByteOrder,
) -> Result<usize, LoadError> {
    let words = words_from_bytes(bytes, order)?;
    load_words(state, &words)
}

/// Loads an image read to the end of `reader`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] on read failure, otherwise see [`load_bytes`].
pub fn load_reader<R: Read>(
    state: &mut MachineState,
    mut reader: R,
    order: ByteOrder,
) -> Result<usize, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_bytes(state, &bytes, order)
}

/// Loads the image stored at `path`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the file cannot be opened or read,
/// otherwise see [`load_bytes`].
pub fn load_file(
    state: &mut MachineState,
    path: impl AsRef<Path>,
    order: ByteOrder,
) -> Result<usize, LoadError> {
    let file = File::open(path)?;
    load_reader(state, file, order)
}
