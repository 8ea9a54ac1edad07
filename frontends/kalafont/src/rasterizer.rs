//! The bitmap rasterizer collaborator, backed by `ab_glyph`.
//!
//! Covers printable Basic Latin and Latin-1 Supplement. Glyphs render at
//! `glyph_height * super_sample` pixels and are box-filtered back down, so
//! the supersampling multiplier trades compile time for smoother coverage.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use tracing::debug;

use kalafont_backend::bitmap::{BitmapGlyph, Rasterize};
use kalafont_backend::{Error, Result};

const CHARSET: [RangeInclusive<u32>; 2] = [0x20..=0x7E, 0xA0..=0xFF];

pub struct AbGlyphRasterizer;

impl Rasterize for AbGlyphRasterizer {
    fn rasterize(
        &self,
        input: &Path,
        glyph_height: u16,
        super_sample: u8,
    ) -> Result<Vec<BitmapGlyph>> {
        let data = fs::read(input)?;
        let font = FontRef::try_from_slice(&data)
            .map_err(|_| Error::UnsupportedContainer("rasterizer could not read the font"))?;

        let factor = super_sample.max(1) as u32;
        let render_scale = PxScale::from((glyph_height as u32 * factor) as f32);
        let metric_font = font.as_scaled(PxScale::from(glyph_height as f32));

        let mut blocks = Vec::new();
        for codepoint in CHARSET.iter().flat_map(Clone::clone) {
            let Some(ch) = char::from_u32(codepoint) else {
                continue;
            };
            let glyph_id = font.glyph_id(ch);
            if glyph_id.0 == 0 {
                continue; // the font does not map this codepoint
            }
            let advance = metric_font.h_advance(glyph_id).round().max(0.0) as u16;

            let block = match font.outline_glyph(glyph_id.with_scale(render_scale)) {
                Some(outlined) => {
                    let bounds = outlined.px_bounds();
                    let sw = bounds.width().max(0.0).ceil() as u32;
                    let sh = bounds.height().max(0.0).ceil() as u32;
                    let mut coverage = vec![0u8; (sw * sh) as usize];
                    outlined.draw(|x, y, c| {
                        if x < sw && y < sh {
                            coverage[(y * sw + x) as usize] =
                                (c * 255.0).clamp(0.0, 255.0) as u8;
                        }
                    });
                    let (width, height, pixels) = downsample(&coverage, sw, sh, factor);
                    BitmapGlyph {
                        codepoint,
                        width: width as u16,
                        height: height as u16,
                        bearing_x: (bounds.min.x / factor as f32).round() as i16,
                        // px space grows downward; the top bearing is the
                        // rise from the baseline to the bitmap top.
                        bearing_y: (-bounds.min.y / factor as f32).round() as i16,
                        advance,
                        pixels,
                    }
                }
                // Glyphs without an outline (space and friends) still carry
                // an advance.
                None => BitmapGlyph {
                    codepoint,
                    width: 0,
                    height: 0,
                    bearing_x: 0,
                    bearing_y: 0,
                    advance,
                    pixels: Vec::new(),
                },
            };
            blocks.push(block);
        }

        debug!(
            "rasterized {} of {} candidate codepoints",
            blocks.len(),
            CHARSET.iter().map(|r| r.clone().count()).sum::<usize>()
        );
        Ok(blocks)
    }
}

/// Box-filters a supersampled coverage map down by `factor`.
fn downsample(source: &[u8], width: u32, height: u32, factor: u32) -> (u32, u32, Vec<u8>) {
    if factor <= 1 || source.is_empty() {
        return (width, height, source.to_vec());
    }
    let out_width = width.div_ceil(factor);
    let out_height = height.div_ceil(factor);
    let mut out = vec![0u8; (out_width * out_height) as usize];
    for oy in 0..out_height {
        for ox in 0..out_width {
            let mut sum = 0u32;
            let mut samples = 0u32;
            for dy in 0..factor {
                for dx in 0..factor {
                    let sx = ox * factor + dx;
                    let sy = oy * factor + dy;
                    if sx < width && sy < height {
                        sum += source[(sy * width + sx) as usize] as u32;
                        samples += 1;
                    }
                }
            }
            if samples > 0 {
                out[(oy * out_width + ox) as usize] = (sum / samples) as u8;
            }
        }
    }
    (out_width, out_height, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsample_averages_blocks() {
        // 4x2 at factor 2 -> 2x1.
        let source = [0u8, 255, 100, 200, 255, 0, 200, 100];
        let (w, h, out) = downsample(&source, 4, 2, 2);
        assert_eq!((w, h), (2, 1));
        assert_eq!(out, vec![127, 150]);
    }

    #[test]
    fn downsample_handles_ragged_edges() {
        // 3x3 at factor 2 -> 2x2 with partial corner blocks.
        let source = [10u8; 9];
        let (w, h, out) = downsample(&source, 3, 3, 2);
        assert_eq!((w, h), (2, 2));
        assert_eq!(out, vec![10, 10, 10, 10]);
    }

    #[test]
    fn factor_one_is_a_passthrough() {
        let source = [1u8, 2, 3, 4];
        let (w, h, out) = downsample(&source, 2, 2, 1);
        assert_eq!((w, h), (2, 2));
        assert_eq!(out, source.to_vec());
    }
}
