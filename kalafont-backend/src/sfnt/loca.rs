//! Glyph location table.

use crate::error::{Error, Result};
use crate::parse::Bytes;
use crate::sfnt::LOCA;

/// Storage form of the `loca` offsets, taken from `head`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LocaFormat {
    /// 16-bit offsets, stored divided by two.
    Short,
    /// 32-bit offsets.
    Long,
}

/// Decoded `loca` table: `num_glyphs + 1` byte offsets into `glyf`.
#[derive(Clone, Debug)]
pub struct Loca {
    offsets: Vec<u32>,
}

impl Loca {
    /// Decodes and validates the offset array. Offsets must be
    /// non-decreasing and must not run past the end of `glyf`.
    pub fn parse(table: Bytes, format: LocaFormat, num_glyphs: u16, glyf_len: u32) -> Result<Self> {
        let count = num_glyphs as usize + 1;
        let mut offsets = Vec::with_capacity(count);
        for i in 0..count {
            let offset = match format {
                LocaFormat::Short => table.read_u16(i * 2)? as u32 * 2,
                LocaFormat::Long => table.read_u32(i * 4)?,
            };
            if offsets.last().is_some_and(|&prev| offset < prev) {
                return Err(Error::MalformedTable(LOCA));
            }
            offsets.push(offset);
        }
        if offsets.last().is_some_and(|&last| last > glyf_len) {
            return Err(Error::MalformedTable(LOCA));
        }
        Ok(Self { offsets })
    }

    /// Byte range of a glyph within `glyf`, or `None` for an empty glyph.
    pub fn range(&self, glyph_id: u16) -> Option<(u32, u32)> {
        let start = *self.offsets.get(glyph_id as usize)?;
        let end = *self.offsets.get(glyph_id as usize + 1)?;
        (start != end).then_some((start, end))
    }

    /// Number of stored offsets (`num_glyphs + 1`).
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Raw offset at the given index, for diagnostics.
    pub fn offset(&self, index: usize) -> Option<u32> {
        self.offsets.get(index).copied()
    }
}
