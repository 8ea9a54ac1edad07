//! Bitmap-flavor glyph collection.
//!
//! The bitmap rasterizer itself is an external collaborator; the compiler
//! only defines the seam and collects the pre-rendered coverage maps it
//! hands back.

use std::path::Path;

use crate::error::Result;

/// One pre-rasterized glyph as delivered by the rasterizer collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitmapGlyph {
    pub codepoint: u32,
    /// Pixel extents of the coverage map.
    pub width: u16,
    pub height: u16,
    /// Horizontal offset from the pen to the left edge of the map.
    pub bearing_x: i16,
    /// Vertical offset from the baseline up to the top edge of the map.
    pub bearing_y: i16,
    pub advance: u16,
    /// Row-major 8-bit coverage, `width` bytes per row, 0 transparent.
    pub pixels: Vec<u8>,
}

/// The external rasterizer behind the bitmap flavor.
///
/// `super_sample` is opaque to the compiler: implementations may use it for
/// supersampled rendering or ignore it entirely. Blocks must come back in
/// ascending codepoint order.
pub trait Rasterize {
    fn rasterize(
        &self,
        input: &Path,
        glyph_height: u16,
        super_sample: u8,
    ) -> Result<Vec<BitmapGlyph>>;
}
