//! Memory-region geometry and address decoding helpers.

/// Default base address of the instruction region.
pub const INSTRUCTION_BASE: u32 = 0x0040_0000;
/// Default instruction-region capacity in words.
pub const INSTRUCTION_WORDS: u32 = 1024;
/// Default data-region capacity in words.
pub const DATA_WORDS: u32 = 3072;
/// Byte width of one architectural word.
pub const WORD_BYTES: u32 = 4;

/// Region classification for simulated addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemoryRegion {
    /// Program text, loaded at startup.
    Instruction,
    /// Load/store target region, directly after the instruction region.
    Data,
    /// Outside the memory image.
    Unmapped,
}

/// Geometry of the flat memory image: an instruction region followed by a
/// data region of fixed word counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemoryLayout {
    instruction_base: u32,
    instruction_words: u32,
    data_words: u32,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self {
            instruction_base: INSTRUCTION_BASE,
            instruction_words: INSTRUCTION_WORDS,
            data_words: DATA_WORDS,
        }
    }
}

impl MemoryLayout {
    /// Creates a layout from a word-aligned base and region word counts.
    ///
    /// Returns `None` when the base is misaligned or the image would not fit
    /// below the top of the 32-bit address space.
    #[must_use]
    pub const fn new(
        instruction_base: u32,
        instruction_words: u32,
        data_words: u32,
    ) -> Option<Self> {
        if instruction_base % WORD_BYTES != 0 {
            return None;
        }
        let Some(total) = instruction_words.checked_add(data_words) else {
            return None;
        };
        let Some(bytes) = total.checked_mul(WORD_BYTES) else {
            return None;
        };
        if instruction_base.checked_add(bytes).is_none() {
            return None;
        }
        Some(Self {
            instruction_base,
            instruction_words,
            data_words,
        })
    }

    /// First address of the instruction region.
    #[must_use]
    pub const fn instruction_base(&self) -> u32 {
        self.instruction_base
    }

    /// Instruction-region capacity in words.
    #[must_use]
    pub const fn instruction_words(&self) -> u32 {
        self.instruction_words
    }

    /// Data-region capacity in words.
    #[must_use]
    pub const fn data_words(&self) -> u32 {
        self.data_words
    }

    /// First address of the data region.
    #[must_use]
    pub const fn data_base(&self) -> u32 {
        self.instruction_base + self.instruction_words * WORD_BYTES
    }

    /// One past the last byte of the memory image.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.data_base() + self.data_words * WORD_BYTES
    }

    /// Initial stack-pointer value: the address just past the data region.
    #[must_use]
    pub const fn stack_top(&self) -> u32 {
        self.end()
    }

    /// Total number of words backing the image.
    #[must_use]
    pub const fn total_words(&self) -> usize {
        (self.instruction_words + self.data_words) as usize
    }

    /// Classifies an address.
    #[must_use]
    pub const fn region(&self, addr: u32) -> MemoryRegion {
        if addr >= self.instruction_base && addr < self.data_base() {
            MemoryRegion::Instruction
        } else if addr >= self.data_base() && addr < self.end() {
            MemoryRegion::Data
        } else {
            MemoryRegion::Unmapped
        }
    }

    /// Maps an aligned in-image address to its backing word index.
    #[must_use]
    pub const fn word_index(&self, addr: u32) -> Option<usize> {
        if addr % WORD_BYTES != 0 || addr < self.instruction_base || addr >= self.end() {
            return None;
        }
        Some(((addr - self.instruction_base) / WORD_BYTES) as usize)
    }

    /// Maps a backing word index back to its address.
    #[must_use]
    pub const fn address_of(&self, index: usize) -> u32 {
        self.instruction_base + (index as u32) * WORD_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryLayout, MemoryRegion, DATA_WORDS, INSTRUCTION_BASE, INSTRUCTION_WORDS};

    #[test]
    fn default_layout_matches_reference_geometry() {
        let layout = MemoryLayout::default();
        assert_eq!(layout.instruction_base(), 0x0040_0000);
        assert_eq!(layout.data_base(), 0x0040_1000);
        assert_eq!(layout.end(), 0x0040_4000);
        assert_eq!(layout.stack_top(), 0x0040_4000);
        assert_eq!(
            layout.total_words(),
            (INSTRUCTION_WORDS + DATA_WORDS) as usize
        );
    }

    #[test]
    fn region_boundaries_are_half_open() {
        let layout = MemoryLayout::default();
        assert_eq!(layout.region(INSTRUCTION_BASE - 1), MemoryRegion::Unmapped);
        assert_eq!(layout.region(INSTRUCTION_BASE), MemoryRegion::Instruction);
        assert_eq!(layout.region(0x0040_0FFF), MemoryRegion::Instruction);
        assert_eq!(layout.region(0x0040_1000), MemoryRegion::Data);
        assert_eq!(layout.region(0x0040_3FFF), MemoryRegion::Data);
        assert_eq!(layout.region(0x0040_4000), MemoryRegion::Unmapped);
    }

    #[test]
    fn word_index_rejects_misaligned_and_out_of_image() {
        let layout = MemoryLayout::default();
        assert_eq!(layout.word_index(0x0040_0000), Some(0));
        assert_eq!(layout.word_index(0x0040_1000), Some(1024));
        assert_eq!(layout.word_index(0x0040_3FFC), Some(4095));
        assert_eq!(layout.word_index(0x0040_0002), None);
        assert_eq!(layout.word_index(0x0040_4000), None);
        assert_eq!(layout.word_index(0x003F_FFFC), None);
        assert_eq!(layout.address_of(1024), 0x0040_1000);
    }

    #[test]
    fn custom_layout_validates_geometry() {
        assert!(MemoryLayout::new(0x1000, 16, 16).is_some());
        assert!(MemoryLayout::new(0x1002, 16, 16).is_none());
        assert!(MemoryLayout::new(0xFFFF_FF00, 1024, 1024).is_none());

        let small = MemoryLayout::new(0, 4, 4).expect("valid layout");
        assert_eq!(small.data_base(), 16);
        assert_eq!(small.end(), 32);
    }
}
