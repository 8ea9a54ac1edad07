//! Bitmap-flavor (`KTF`) layout.
//!
//! Every field is little-endian; the magic therefore lands on disk as the
//! bytes `'K' 'T' 'F' '\0'`. The 34-byte top header is followed by a lookup
//! table and the glyph blocks it points at:
//!
//! ```text
//! magic                           u32, 0x0046544B ("KTF\0" on disk)
//! version                         u8, always 1
//! kind                            u8, 1 = bitmap, 2 = glyph
//! glyph height                    u16, pixels
//! glyph count                     u32
//! quad index pattern              6 x u8, always {0,1,2,2,3,0}
//! quad uv corners                 4 x 2 x u8
//! glyph table size                u32, bytes
//! glyph block size                u32, bytes
//! glyph table, per glyph:
//!   codepoint                     u32
//!   absolute offset               u32, from start of file to the block
//!   block size                    u32, bytes
//! glyph blocks, per glyph:
//!   codepoint                     u32
//!   width, height                 2 x u16, pixels
//!   bearing x, bearing y          2 x i16
//!   advance                       u16
//!   corner vertices               4 x 2 x i8
//!   raw pixel size                u32
//!   coverage                      raw pixel size bytes, row-major
//! ```

use crate::{Error, Reader, Result};

pub const MAGIC: u32 = 0x0046544B;
pub const VERSION: u8 = 1;
pub const KIND_BITMAP: u8 = 1;
pub const KIND_GLYPH: u8 = 2;

pub const TOP_HEADER_SIZE: usize = 34;
pub const TABLE_ENTRY_SIZE: usize = 12;
pub const BLOCK_HEADER_SIZE: usize = 26;

pub const MAX_GLYPHS: usize = 1024;
pub const MIN_GLYPH_HEIGHT: u16 = 12;
pub const MAX_GLYPH_HEIGHT: u16 = 255;

/// Index pattern shared by every glyph quad.
pub const QUAD_INDICES: [u8; 6] = [0, 1, 2, 2, 3, 0];
/// UV corners shared by every glyph quad, top-left first.
pub const QUAD_UVS: [[u8; 2]; 4] = [[0, 255], [255, 0], [255, 255], [0, 255]];

/// One pre-rasterized glyph: metrics, quad corners and raw coverage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBlock {
    pub codepoint: u32,
    pub width: u16,
    pub height: u16,
    pub bearing_x: i16,
    pub bearing_y: i16,
    pub advance: u16,
    /// Quad corners in bearing space: top-left, top-right, bottom-right,
    /// bottom-left.
    pub corners: [[i8; 2]; 4],
    /// Row-major 8-bit coverage, `width` bytes per row.
    pub pixels: Vec<u8>,
}

impl GlyphBlock {
    /// Builds a block, deriving the quad corners from the bearings and
    /// pixel extents. Corners that do not narrow to `i8` mean the glyph
    /// cannot be represented at this height.
    pub fn new(
        codepoint: u32,
        width: u16,
        height: u16,
        bearing_x: i16,
        bearing_y: i16,
        advance: u16,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(Error::Inconsistent("coverage size does not match extents"));
        }
        let narrow = |value: i32| -> Result<i8> {
            i8::try_from(value).map_err(|_| Error::GlyphTooLarge(codepoint))
        };
        let (bx, by) = (bearing_x as i32, bearing_y as i32);
        let (w, h) = (width as i32, height as i32);
        let corners = [
            [narrow(bx)?, narrow(by)?],
            [narrow(bx + w)?, narrow(by)?],
            [narrow(bx + w)?, narrow(by - h)?],
            [narrow(bx)?, narrow(by - h)?],
        ];
        Ok(Self {
            codepoint,
            width,
            height,
            bearing_x,
            bearing_y,
            advance,
            corners,
            pixels,
        })
    }

    fn size(&self) -> usize {
        BLOCK_HEADER_SIZE + self.pixels.len()
    }
}

/// A bitmap-flavor compiled font.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitmapFile {
    pub glyph_height: u16,
    pub glyphs: Vec<GlyphBlock>,
}

impl BitmapFile {
    /// Serializes the file. Every constraint is checked before the first
    /// byte is produced.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.glyphs.len() > MAX_GLYPHS {
            return Err(Error::TooManyGlyphs(self.glyphs.len()));
        }
        if !(MIN_GLYPH_HEIGHT..=MAX_GLYPH_HEIGHT).contains(&self.glyph_height) {
            return Err(Error::BadGlyphHeight(self.glyph_height));
        }

        let table_size = self.glyphs.len() * TABLE_ENTRY_SIZE;
        let blocks_size: usize = self.glyphs.iter().map(GlyphBlock::size).sum();
        let mut out = Vec::with_capacity(TOP_HEADER_SIZE + table_size + blocks_size);

        out.extend_from_slice(&MAGIC.to_le_bytes());
        out.push(VERSION);
        out.push(KIND_BITMAP);
        out.extend_from_slice(&self.glyph_height.to_le_bytes());
        out.extend_from_slice(&(self.glyphs.len() as u32).to_le_bytes());
        out.extend_from_slice(&QUAD_INDICES);
        for uv in QUAD_UVS {
            out.extend_from_slice(&uv);
        }
        out.extend_from_slice(&(table_size as u32).to_le_bytes());
        out.extend_from_slice(&(blocks_size as u32).to_le_bytes());

        let mut block_offset = TOP_HEADER_SIZE + table_size;
        for glyph in &self.glyphs {
            out.extend_from_slice(&glyph.codepoint.to_le_bytes());
            out.extend_from_slice(&(block_offset as u32).to_le_bytes());
            out.extend_from_slice(&(glyph.size() as u32).to_le_bytes());
            block_offset += glyph.size();
        }

        for glyph in &self.glyphs {
            out.extend_from_slice(&glyph.codepoint.to_le_bytes());
            out.extend_from_slice(&glyph.width.to_le_bytes());
            out.extend_from_slice(&glyph.height.to_le_bytes());
            out.extend_from_slice(&glyph.bearing_x.to_le_bytes());
            out.extend_from_slice(&glyph.bearing_y.to_le_bytes());
            out.extend_from_slice(&glyph.advance.to_le_bytes());
            for corner in glyph.corners {
                out.push(corner[0] as u8);
                out.push(corner[1] as u8);
            }
            out.extend_from_slice(&(glyph.pixels.len() as u32).to_le_bytes());
            out.extend_from_slice(&glyph.pixels);
        }

        Ok(out)
    }

    /// Re-reads a serialized bitmap-flavor file.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);

        let magic = r.u32()?;
        if magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }
        let version = r.u8()?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let kind = r.u8()?;
        if kind != KIND_BITMAP {
            return Err(Error::UnsupportedKind(kind));
        }
        let glyph_height = r.u16()?;
        let count = r.u32()? as usize;
        if count > MAX_GLYPHS {
            return Err(Error::TooManyGlyphs(count));
        }
        r.bytes(6)?; // index pattern
        r.bytes(8)?; // uv corners
        let table_size = r.u32()? as usize;
        if table_size != count * TABLE_ENTRY_SIZE {
            return Err(Error::Inconsistent("glyph table size does not match count"));
        }
        let _blocks_size = r.u32()?;
        r.bytes(table_size)?;

        let mut glyphs = Vec::with_capacity(count);
        for _ in 0..count {
            let codepoint = r.u32()?;
            let width = r.u16()?;
            let height = r.u16()?;
            let bearing_x = r.i16()?;
            let bearing_y = r.i16()?;
            let advance = r.u16()?;
            let mut corners = [[0i8; 2]; 4];
            for corner in &mut corners {
                corner[0] = r.i8()?;
                corner[1] = r.i8()?;
            }
            let pixel_size = r.u32()? as usize;
            if pixel_size != width as usize * height as usize {
                return Err(Error::Inconsistent("coverage size does not match extents"));
            }
            let pixels = r.bytes(pixel_size)?.to_vec();
            glyphs.push(GlyphBlock {
                codepoint,
                width,
                height,
                bearing_x,
                bearing_y,
                advance,
                corners,
                pixels,
            });
        }

        Ok(Self {
            glyph_height,
            glyphs,
        })
    }
}
