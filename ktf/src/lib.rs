//! Compiled-font container format.
//!
//! A `.ktf` file is the runtime-ready binary produced by the kalafont
//! compiler. Renderers memory-map it and use it directly; nothing in here
//! requires the original `.ttf`/`.otf` at load time. Two flavors exist:
//!
//! - [`glyph::GlyphFile`] keeps every glyph as a triangulated 2D mesh with
//!   affine hints (`KFNT` layout).
//! - [`bitmap::BitmapFile`] keeps every glyph as a pre-rasterized 8-bit
//!   coverage map at a fixed pixel height (`KTF` layout).
//!
//! Both layouts are stable ABI: the byte sequences documented in the flavor
//! modules are exact.

pub mod bitmap;
pub mod glyph;

use thiserror::Error;

/// Canonical file extension for compiled fonts.
pub const EXTENSION: &str = "ktf";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("too many glyphs for one compiled font: {0} (limit 1024)")]
    TooManyGlyphs(usize),
    #[error("glyph U+{0:04X} does not fit the compiled layout")]
    GlyphTooLarge(u32),
    #[error("glyph height {0} outside the supported range 12..=255")]
    BadGlyphHeight(u16),
    #[error("compiled font truncated at offset {offset}")]
    Truncated { offset: usize },
    #[error("not a compiled font (magic {0:#010x})")]
    BadMagic(u32),
    #[error("unsupported compiled-font version {0}")]
    UnsupportedVersion(u8),
    #[error("unsupported compiled-font kind {0}")]
    UnsupportedKind(u8),
    #[error("inconsistent compiled-font structure: {0}")]
    Inconsistent(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A compiled font ready for serialization, one variant per output flavor.
///
/// The two flavors share nothing on disk, but every caller wants the same
/// thing from them: bytes. `encode` is the single dispatch point.
#[derive(Clone, Debug)]
pub enum CompiledFont {
    Glyph(glyph::GlyphFile),
    Bitmap(bitmap::BitmapFile),
}

impl CompiledFont {
    /// Serializes the compiled font. All layout constraints are enforced
    /// before any bytes are produced, so a failing encode leaves nothing
    /// half-written.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Self::Glyph(file) => Ok(file.encode()),
            Self::Bitmap(file) => file.encode(),
        }
    }
}

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(Error::Truncated {
                offset: self.offset,
            })?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn i16(&mut self) -> Result<i16> {
        Ok(self.u16()? as i16)
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.u32()?))
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }
}
