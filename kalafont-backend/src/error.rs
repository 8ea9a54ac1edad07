//! Compiler error taxonomy.

use thiserror::Error;

use crate::sfnt::RawTag;

#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported font container: {0}")]
    UnsupportedContainer(&'static str),
    #[error("required table '{}' is missing", tag_name(.0))]
    MissingTable(RawTag),
    #[error("table '{}' is malformed", tag_name(.0))]
    MalformedTable(RawTag),
    #[error("font data truncated at offset {offset}")]
    Truncated { offset: usize },
    #[error("glyph {glyph} is malformed: {reason}")]
    MalformedGlyph { glyph: u16, reason: &'static str },
    #[error("glyph {0} did not triangulate and was dropped")]
    DegenerateGlyph(u16),
    #[error("glyph {0} exceeds the per-glyph mesh caps")]
    GlyphTooLarge(u16),
}

pub type Result<T> = std::result::Result<T, Error>;

fn tag_name(tag: &RawTag) -> String {
    tag.to_be_bytes()
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            }
        })
        .collect()
}
