//! sfnt container decoding.
//!
//! Parses the table directory shared by TrueType and OpenType and the fixed
//! layout tables needed to reach glyph outlines. The decoder is eager: the
//! [`Container`] owns decoded values, not lazy views, because everything it
//! holds is consumed by the compile anyway.

pub mod head;
pub mod loca;
pub mod xmtx;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::parse::Bytes;

pub use head::{Head, Hhea, Maxp};
pub use loca::{Loca, LocaFormat};
pub use xmtx::HMetric;

pub type RawTag = u32;

/// Returns a tag value for the specified four bytes.
pub const fn raw_tag(bytes: &[u8; 4]) -> RawTag {
    (bytes[0] as u32) << 24 | (bytes[1] as u32) << 16 | (bytes[2] as u32) << 8 | bytes[3] as u32
}

pub const HEAD: RawTag = raw_tag(b"head");
pub const MAXP: RawTag = raw_tag(b"maxp");
pub const HHEA: RawTag = raw_tag(b"hhea");
pub const HMTX: RawTag = raw_tag(b"hmtx");
pub const LOCA: RawTag = raw_tag(b"loca");
pub const GLYF: RawTag = raw_tag(b"glyf");
pub const CFF: RawTag = raw_tag(b"CFF ");

/// TrueType scaler type.
pub const TRUETYPE: u32 = 0x00010000;
/// OpenType (CFF-family) scaler type.
pub const OTTO: u32 = raw_tag(b"OTTO");

/// Container family derived from the scaler type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scaler {
    TrueType,
    OpenType,
}

/// A single entry in the sfnt table directory.
#[derive(Copy, Clone, Debug)]
pub struct TableRecord {
    pub tag: RawTag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

/// A decoded font container, ready for per-glyph outline expansion.
#[derive(Debug)]
pub struct Container<'a> {
    data: Bytes<'a>,
    pub scaler: Scaler,
    /// Directory records in file order, for diagnostics.
    pub records: Vec<TableRecord>,
    pub head: Head,
    pub maxp: Maxp,
    pub hhea: Hhea,
    pub hmetrics: Vec<HMetric>,
    pub loca: Loca,
    glyf: TableRecord,
}

impl<'a> Container<'a> {
    /// Decodes the table directory and every table needed to reach glyph
    /// outlines. Any malformed field aborts the whole parse.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let data = Bytes::new(data);
        let mut s = data.stream_at(0);

        let scaler = match s.read_u32()? {
            TRUETYPE => Scaler::TrueType,
            OTTO => Scaler::OpenType,
            _ => return Err(Error::UnsupportedContainer("unrecognized scaler type")),
        };

        let num_tables = s.read_u16()?;
        s.skip(6)?; // searchRange, entrySelector, rangeShift

        let mut records = Vec::with_capacity(num_tables as usize);
        let mut index = FxHashMap::default();
        for _ in 0..num_tables {
            let record = TableRecord {
                tag: s.read_tag()?,
                checksum: s.read_u32()?,
                offset: s.read_u32()?,
                length: s.read_u32()?,
            };
            match record.offset.checked_add(record.length) {
                Some(end) if end as usize <= data.len() => {}
                _ => return Err(Error::MalformedTable(record.tag)),
            }
            // Duplicate tags resolve to the first occurrence.
            index.entry(record.tag).or_insert(record);
            records.push(record);
        }

        let lookup = |tag: RawTag| -> Result<TableRecord> {
            index.get(&tag).copied().ok_or(Error::MissingTable(tag))
        };
        let table = |record: TableRecord| -> Result<Bytes<'a>> {
            data.slice(record.offset as usize, record.length as usize)
        };

        let head = Head::parse(table(lookup(HEAD)?)?)?;
        let maxp = Maxp::parse(table(lookup(MAXP)?)?)?;
        let hhea = Hhea::parse(table(lookup(HHEA)?)?)?;
        let hmetrics = xmtx::horizontal_metrics(
            table(lookup(HMTX)?)?,
            hhea.num_long_metrics,
            maxp.num_glyphs,
        )?;

        // The CFF glyph store is recognized but its decoder is stubbed, so
        // an OpenType container without TrueType outlines stops here.
        let glyf = match (lookup(GLYF), scaler) {
            (Ok(record), _) => record,
            (Err(_), Scaler::OpenType) => {
                return Err(Error::UnsupportedContainer("CFF outlines are not supported"))
            }
            (Err(missing), Scaler::TrueType) => return Err(missing),
        };
        let loca = Loca::parse(
            table(lookup(LOCA)?)?,
            head.loca_format,
            maxp.num_glyphs,
            glyf.length,
        )?;

        Ok(Self {
            data,
            scaler,
            records,
            head,
            maxp,
            hhea,
            hmetrics,
            loca,
            glyf,
        })
    }

    pub fn num_glyphs(&self) -> u16 {
        self.maxp.num_glyphs
    }

    /// Horizontal metrics for a glyph.
    pub fn metric(&self, glyph_id: u16) -> HMetric {
        self.hmetrics
            .get(glyph_id as usize)
            .copied()
            .unwrap_or(HMetric { advance: 0, lsb: 0 })
    }

    /// The raw `glyf` record for a glyph, or `None` for an empty glyph.
    pub fn glyph_data(&self, glyph_id: u16) -> Result<Option<Bytes<'a>>> {
        let Some((start, end)) = self.loca.range(glyph_id) else {
            return Ok(None);
        };
        let glyf = self
            .data
            .slice(self.glyf.offset as usize, self.glyf.length as usize)?;
        Ok(Some(glyf.slice(start as usize, (end - start) as usize)?))
    }
}
