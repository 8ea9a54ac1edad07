//! Font header tables.

use crate::error::{Error, Result};
use crate::parse::Bytes;
use crate::sfnt::{loca::LocaFormat, HEAD, HHEA, MAXP};

/// Decoded `head` table.
#[derive(Copy, Clone, Debug)]
pub struct Head {
    /// Design units per em. Validated to `1..=16384`.
    pub units_per_em: u16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub loca_format: LocaFormat,
    pub mac_style: u16,
    pub flags: u16,
}

impl Head {
    /// The expected value of the 'magic' field in the header table.
    pub const MAGIC: u32 = 0x5F0F3CF5;

    pub fn parse(table: Bytes) -> Result<Self> {
        let magic = table.read_u32(12)?;
        if magic != Self::MAGIC {
            return Err(Error::MalformedTable(HEAD));
        }
        let flags = table.read_u16(16)?;
        let units_per_em = table.read_u16(18)?;
        if !(1..=16384).contains(&units_per_em) {
            return Err(Error::MalformedTable(HEAD));
        }
        let x_min = table.read_i16(36)?;
        let y_min = table.read_i16(38)?;
        let x_max = table.read_i16(40)?;
        let y_max = table.read_i16(42)?;
        let mac_style = table.read_u16(44)?;
        let loca_format = match table.read_i16(50)? {
            0 => LocaFormat::Short,
            1 => LocaFormat::Long,
            _ => return Err(Error::MalformedTable(HEAD)),
        };

        Ok(Self {
            units_per_em,
            x_min,
            y_min,
            x_max,
            y_max,
            loca_format,
            mac_style,
            flags,
        })
    }
}

/// Decoded `maxp` table.
#[derive(Copy, Clone, Debug)]
pub struct Maxp {
    pub num_glyphs: u16,
}

impl Maxp {
    pub fn parse(table: Bytes) -> Result<Self> {
        let version = table.read_u32(0)?;
        // Version 0.5 (CFF) or 1.0 (TrueType).
        if version != 0x00005000 && version != 0x00010000 {
            return Err(Error::MalformedTable(MAXP));
        }
        let num_glyphs = table.read_u16(4)?;
        if num_glyphs == 0 {
            return Err(Error::MalformedTable(MAXP));
        }
        Ok(Self { num_glyphs })
    }
}

/// Decoded `hhea` (horizontal header) table.
#[derive(Copy, Clone, Debug)]
pub struct Hhea {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    /// Number of long metric records at the front of `hmtx`.
    pub num_long_metrics: u16,
}

impl Hhea {
    pub fn parse(table: Bytes) -> Result<Self> {
        let ascender = table.read_i16(4)?;
        let descender = table.read_i16(6)?;
        let line_gap = table.read_i16(8)?;
        let advance_width_max = table.read_u16(10)?;
        let num_long_metrics = table.read_u16(34)?;
        if num_long_metrics == 0 {
            return Err(Error::MalformedTable(HHEA));
        }
        Ok(Self {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            num_long_metrics,
        })
    }
}
