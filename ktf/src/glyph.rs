//! Glyph-flavor (`KFNT`) layout.
//!
//! Every field is little-endian. The file is a header followed by one block
//! per retained glyph:
//!
//! ```text
//! "KFNT"                          4 bytes
//! version                         u32, always 1
//! glyph count                     u32
//! per glyph:
//!   "GLYF"                        4 bytes
//!   glyph index                   u32
//!   advance width                 f32, EM-normalized
//!   left side bearing             f32, EM-normalized
//!   anchor x, anchor y            2 x f32
//!   transform                     4 x f32, row-major 2x2 affine hint
//!   "VERT"                        4 bytes
//!   vertex count                  u32, in (x, y) pairs
//!   coordinates                   2 x count x f32, interleaved
//!   "INDI"                        4 bytes
//!   index count                   u32
//!   triangle indices              count x u32
//! ```
//!
//! Glyphs whose mesh came out empty carry no renderable geometry and are
//! dropped at encode time.

use crate::{Error, Reader, Result};

pub const MAGIC: [u8; 4] = *b"KFNT";
pub const VERSION: u32 = 1;

const GLYPH_TAG: [u8; 4] = *b"GLYF";
const VERTEX_TAG: [u8; 4] = *b"VERT";
const INDEX_TAG: [u8; 4] = *b"INDI";

/// One triangulated glyph as stored in the glyph flavor.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRecord {
    pub glyph_id: u32,
    /// EM-normalized advance width.
    pub advance: f32,
    /// EM-normalized left side bearing.
    pub lsb: f32,
    pub anchor: [f32; 2],
    /// Row-major 2x2 affine hint; identity unless inherited from a composite.
    pub transform: [f32; 4],
    /// Interleaved `(x, y)` coordinates in EM space.
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl GlyphRecord {
    fn is_renderable(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }
}

/// A glyph-flavor compiled font: the retained meshes in ascending glyph
/// index order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphFile {
    pub glyphs: Vec<GlyphRecord>,
}

impl GlyphFile {
    /// Serializes the file, dropping glyphs with empty vertex or index
    /// arrays.
    pub fn encode(&self) -> Vec<u8> {
        let retained: Vec<&GlyphRecord> =
            self.glyphs.iter().filter(|g| g.is_renderable()).collect();

        let payload: usize = retained
            .iter()
            .map(|g| 4 + 4 + 8 * 4 + 4 + 4 + g.vertices.len() * 4 + 4 + 4 + g.indices.len() * 4)
            .sum();
        let mut out = Vec::with_capacity(12 + payload);

        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&(retained.len() as u32).to_le_bytes());

        for glyph in retained {
            out.extend_from_slice(&GLYPH_TAG);
            out.extend_from_slice(&glyph.glyph_id.to_le_bytes());
            out.extend_from_slice(&glyph.advance.to_le_bytes());
            out.extend_from_slice(&glyph.lsb.to_le_bytes());
            for value in glyph.anchor {
                out.extend_from_slice(&value.to_le_bytes());
            }
            for value in glyph.transform {
                out.extend_from_slice(&value.to_le_bytes());
            }

            out.extend_from_slice(&VERTEX_TAG);
            out.extend_from_slice(&((glyph.vertices.len() / 2) as u32).to_le_bytes());
            for coord in &glyph.vertices {
                out.extend_from_slice(&coord.to_le_bytes());
            }

            out.extend_from_slice(&INDEX_TAG);
            out.extend_from_slice(&(glyph.indices.len() as u32).to_le_bytes());
            for index in &glyph.indices {
                out.extend_from_slice(&index.to_le_bytes());
            }
        }

        out
    }

    /// Re-reads a serialized glyph-flavor file.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);

        let magic = r.bytes(4)?;
        if magic != MAGIC {
            let raw = u32::from_le_bytes([magic[0], magic[1], magic[2], magic[3]]);
            return Err(Error::BadMagic(raw));
        }
        let version = r.u32()?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version.min(u8::MAX as u32) as u8));
        }
        let count = r.u32()? as usize;

        let mut glyphs = Vec::with_capacity(count);
        for _ in 0..count {
            if r.bytes(4)? != GLYPH_TAG {
                return Err(Error::Inconsistent("expected GLYF block tag"));
            }
            let glyph_id = r.u32()?;
            let advance = r.f32()?;
            let lsb = r.f32()?;
            let anchor = [r.f32()?, r.f32()?];
            let transform = [r.f32()?, r.f32()?, r.f32()?, r.f32()?];

            if r.bytes(4)? != VERTEX_TAG {
                return Err(Error::Inconsistent("expected VERT sub-block tag"));
            }
            let vertex_count = r.u32()? as usize;
            let mut vertices = Vec::with_capacity(vertex_count * 2);
            for _ in 0..vertex_count * 2 {
                vertices.push(r.f32()?);
            }

            if r.bytes(4)? != INDEX_TAG {
                return Err(Error::Inconsistent("expected INDI sub-block tag"));
            }
            let index_count = r.u32()? as usize;
            let mut indices = Vec::with_capacity(index_count);
            for _ in 0..index_count {
                let index = r.u32()?;
                if index as usize >= vertex_count {
                    return Err(Error::Inconsistent("triangle index out of range"));
                }
                indices.push(index);
            }
            if index_count % 3 != 0 {
                return Err(Error::Inconsistent("triangle index count not divisible by 3"));
            }

            glyphs.push(GlyphRecord {
                glyph_id,
                advance,
                lsb,
                anchor,
                transform,
                vertices,
                indices,
            });
        }

        Ok(Self { glyphs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(glyph_id: u32) -> GlyphRecord {
        GlyphRecord {
            glyph_id,
            advance: 0.5,
            lsb: 0.1,
            anchor: [0.1, 0.0],
            transform: [1.0, 0.0, 0.0, 1.0],
            vertices: vec![0.1, 0.1, 0.9, 0.1, 0.9, 0.9, 0.1, 0.9],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let file = GlyphFile {
            glyphs: vec![quad(3), quad(65)],
        };
        let bytes = file.encode();
        let back = GlyphFile::decode(&bytes).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn encode_drops_empty_meshes() {
        let mut empty = quad(1);
        empty.vertices.clear();
        empty.indices.clear();
        let file = GlyphFile {
            glyphs: vec![empty, quad(2)],
        };
        let back = GlyphFile::decode(&file.encode()).unwrap();
        assert_eq!(back.glyphs.len(), 1);
        assert_eq!(back.glyphs[0].glyph_id, 2);
    }

    #[test]
    fn header_layout_is_exact() {
        let file = GlyphFile { glyphs: vec![] };
        let bytes = file.encode();
        assert_eq!(&bytes[0..4], b"KFNT");
        assert_eq!(bytes[4..8], 1u32.to_le_bytes());
        assert_eq!(bytes[8..12], 0u32.to_le_bytes());
        assert_eq!(bytes.len(), 12);
    }

    #[test]
    fn decode_rejects_foreign_magic() {
        let err = GlyphFile::decode(b"NOPE\0\0\0\0\0\0\0\0").unwrap_err();
        assert!(matches!(err, Error::BadMagic(_)));
    }

    #[test]
    fn decode_rejects_truncation() {
        let file = GlyphFile {
            glyphs: vec![quad(9)],
        };
        let bytes = file.encode();
        let err = GlyphFile::decode(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
    }

    #[test]
    fn decode_rejects_out_of_range_index() {
        let mut bad = quad(7);
        bad.indices[4] = 4;
        let file = GlyphFile { glyphs: vec![bad] };
        let err = GlyphFile::decode(&file.encode()).unwrap_err();
        assert!(matches!(err, Error::Inconsistent(_)));
    }
}
