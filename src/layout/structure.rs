//! Bit-packed structure codes.
//!
//! A [`StructureCode`] describes, in a single `u64`, how many bytes every level of an
//! inheritance chain contributes to an entity's block sequence. Nibble `h` (bits `h*4..h*4+4`)
//! holds the block-size code of class height `h`, for `h` in `1..=15`; nibble 0 is unused.
//! A block-size code is an index into the table of supported block sizes:
//!
//! ```text
//! code   0  1  2  3  4   5   6   7    8    9    10    11    12    13    14     15
//! bytes  0  1  2  4  8  16  32  64  128  256   512  1024  2048  4096  8192  16384
//! ```
//!
//! The layout is a wire format shared with the block header codec and must not change.
//!
//! Encoding never fails: lengths that are not in the table saturate to code 15, and heights
//! outside `1..=15` are ignored. Validation reports both situations. [`StructureCodeBuilder`]
//! is the checked alternative that refuses to write a level twice.
//!
//! # Examples
//!
//! ```rust
//! use blocklayout::StructureCode;
//!
//! // Derived entity at height 2 with a 64 byte block, base at height 1 with 16 bytes.
//! let code = StructureCode::new(2, 64).add_inner_block(1, 16);
//!
//! assert_eq!(code.raw(), 0x750);
//! assert_eq!(code.block_length(1), 16);
//! assert_eq!(code.block_length(2), 64);
//! assert_eq!(code.total_length(), 80);
//! ```

use std::{fmt, ops::Range};

use crate::{layout::MAX_CLASS_HEIGHT, Error, Result};

/// Supported block sizes, indexed by block-size code
pub const BLOCK_SIZES: [u32; 16] = [
    0, 1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384,
];

/// Largest block-size code; unsupported lengths saturate to it
pub const MAX_BLOCK_SIZE_CODE: u8 = 15;

/// Maps a block length onto its block-size code.
///
/// Lengths that are not in [`BLOCK_SIZES`] saturate to [`MAX_BLOCK_SIZE_CODE`].
#[must_use]
pub fn block_size_code(block_length: u32) -> u8 {
    BLOCK_SIZES
        .iter()
        .position(|&size| size == block_length)
        .and_then(|index| u8::try_from(index).ok())
        .unwrap_or(MAX_BLOCK_SIZE_CODE)
}

/// Maps a block-size code back onto its block length (only the low nibble is used).
#[must_use]
pub fn block_size_from_code(code: u8) -> u32 {
    BLOCK_SIZES[usize::from(code & 0xF)]
}

fn level_shift(class_height: u32) -> Option<u32> {
    if (1..=MAX_CLASS_HEIGHT).contains(&class_height) {
        Some(class_height * 4)
    } else {
        None
    }
}

/// Per-level block sizes of an inheritance chain, packed into nibbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StructureCode(u64);

impl StructureCode {
    /// A code describing a single level.
    #[must_use]
    pub fn new(class_height: u32, block_length: u32) -> Self {
        StructureCode(0).add_inner_block(class_height, block_length)
    }

    /// Wraps a raw code, as read from a block header
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        StructureCode(raw)
    }

    /// ORs the block-size code of another level into its nibble.
    ///
    /// Heights outside `1..=15` contribute nothing.
    #[must_use]
    pub fn add_inner_block(self, class_height: u32, block_length: u32) -> Self {
        match level_shift(class_height) {
            Some(shift) => StructureCode(self.0 | (u64::from(block_size_code(block_length)) << shift)),
            None => self,
        }
    }

    /// ORs all levels of another code into this one
    #[must_use]
    pub fn add_structure(self, other: StructureCode) -> Self {
        StructureCode(self.0 | other.0)
    }

    /// The block-size code stored for `class_height` (0 for unused or invalid heights)
    #[must_use]
    pub fn block_code(&self, class_height: u32) -> u8 {
        match level_shift(class_height) {
            Some(shift) => ((self.0 >> shift) & 0xF) as u8,
            None => 0,
        }
    }

    /// The block length stored for `class_height`
    #[must_use]
    pub fn block_length(&self, class_height: u32) -> u32 {
        block_size_from_code(self.block_code(class_height))
    }

    /// Non-empty levels as `(class_height, block_length)`, root first
    #[must_use]
    pub fn levels(&self) -> Vec<(u32, u32)> {
        (1..=MAX_CLASS_HEIGHT)
            .map(|height| (height, self.block_length(height)))
            .filter(|&(_, length)| length > 0)
            .collect()
    }

    /// Sum of all level lengths, the size of the full block sequence
    #[must_use]
    pub fn total_length(&self) -> u64 {
        (1..=MAX_CLASS_HEIGHT)
            .map(|height| u64::from(self.block_length(height)))
            .sum()
    }

    /// Byte range of every non-empty level inside one concatenated block sequence.
    ///
    /// Levels are stored root first, so a reader can split a byte sequence into one block per
    /// inheritance level without consulting any schema.
    #[must_use]
    pub fn level_ranges(&self) -> Vec<(u32, Range<u64>)> {
        let mut start = 0u64;
        self.levels()
            .into_iter()
            .map(|(height, length)| {
                let end = start + u64::from(length);
                let range = start..end;
                start = end;
                (height, range)
            })
            .collect()
    }

    /// The raw integer value
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StructureCode {
    fn from(raw: u64) -> Self {
        StructureCode(raw)
    }
}

impl From<StructureCode> for u64 {
    fn from(code: StructureCode) -> Self {
        code.0
    }
}

impl fmt::Display for StructureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

/// Checked composition of a [`StructureCode`].
///
/// Every level may be written exactly once, and only heights `1..=15` are accepted.
#[derive(Debug, Clone, Default)]
pub struct StructureCodeBuilder {
    code: StructureCode,
    written: u16,
}

impl StructureCodeBuilder {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the level `class_height`.
    ///
    /// # Errors
    /// Returns [`Error::ClassHeightOutOfRange`] for heights outside `1..=15` and
    /// [`Error::StructureLevelOverlap`] if the level was already written.
    pub fn add_inner_block(&mut self, class_height: u32, block_length: u32) -> Result<&mut Self> {
        let level = Self::level(class_height)?;
        let mask = 1u16 << level;
        if self.written & mask != 0 {
            return Err(Error::StructureLevelOverlap(level));
        }

        self.written |= mask;
        self.code = self.code.add_inner_block(class_height, block_length);
        Ok(self)
    }

    /// Merges every non-empty level of `other`.
    ///
    /// # Errors
    /// Returns [`Error::StructureLevelOverlap`] for the first level already written.
    pub fn add_structure(&mut self, other: StructureCode) -> Result<&mut Self> {
        for (height, length) in other.levels() {
            self.add_inner_block(height, length)?;
        }
        Ok(self)
    }

    /// Returns true if `class_height` has been written
    #[must_use]
    pub fn has_level(&self, class_height: u32) -> bool {
        Self::level(class_height).is_ok_and(|level| self.written & (1u16 << level) != 0)
    }

    /// The composed code
    #[must_use]
    pub fn build(&self) -> StructureCode {
        self.code
    }

    fn level(class_height: u32) -> Result<u8> {
        if !(1..=MAX_CLASS_HEIGHT).contains(&class_height) {
            return Err(Error::ClassHeightOutOfRange(class_height));
        }
        u8::try_from(class_height).map_err(|_| Error::ClassHeightOutOfRange(class_height))
    }
}
