//! Glyph outline decoding.
//!
//! Expands `glyf` records into contour lists. Simple glyphs decode the
//! flag/coordinate delta streams directly; composite glyphs are expanded
//! eagerly, so everything downstream of this module only ever sees plain
//! contours. Hinting instruction streams are skipped unread.

use crate::error::{Error, Result};
use crate::parse::Stream;
use crate::sfnt::Container;

// Simple glyph flag bits.
const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const REPEAT: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

// Composite component flag bits.
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// Composite recursion guard.
pub const MAX_COMPOSITE_DEPTH: u32 = 32;

const IDENTITY: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// One contour point in font units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlyphPoint {
    pub x: f32,
    pub y: f32,
    pub on_curve: bool,
}

pub type Contour = Vec<GlyphPoint>;

/// A fully expanded glyph outline.
#[derive(Clone, Debug, Default)]
pub struct Outline {
    pub contours: Vec<Contour>,
    /// Tight bounds of the expanded points: `[x_min, y_min, x_max, y_max]`.
    pub bounds: [f32; 4],
    /// Affine hint in `glyf` storage order `[xx, xy, yx, yy]`: identity for
    /// simple glyphs, the first non-identity component transform otherwise.
    pub transform: [f32; 4],
}

/// The fixed header of a non-empty `glyf` record, for diagnostics.
#[derive(Copy, Clone, Debug)]
pub struct GlyphHeader {
    pub contour_count: i16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

/// Reads the 10-byte glyph header, or `None` for an empty glyph.
pub fn read_header(container: &Container, glyph_id: u16) -> Result<Option<GlyphHeader>> {
    let Some(data) = container.glyph_data(glyph_id)? else {
        return Ok(None);
    };
    let mut s = data.stream_at(0);
    let header = (|| -> Result<GlyphHeader> {
        Ok(GlyphHeader {
            contour_count: s.read_i16()?,
            x_min: s.read_i16()?,
            y_min: s.read_i16()?,
            x_max: s.read_i16()?,
            y_max: s.read_i16()?,
        })
    })()
    .map_err(|e| malformed(e, glyph_id))?;
    Ok(Some(header))
}

/// Decodes a glyph into contours, expanding composites recursively.
pub fn decode(container: &Container, glyph_id: u16) -> Result<Outline> {
    let mut outline = Outline {
        transform: IDENTITY,
        ..Outline::default()
    };
    let mut hint = None;
    decode_into(container, glyph_id, 0, &mut outline.contours, &mut hint)?;
    if let Some(transform) = hint {
        outline.transform = transform;
    }

    let points = outline.contours.iter().flatten();
    let mut bounds = [f32::MAX, f32::MAX, f32::MIN, f32::MIN];
    let mut any = false;
    for p in points {
        bounds[0] = bounds[0].min(p.x);
        bounds[1] = bounds[1].min(p.y);
        bounds[2] = bounds[2].max(p.x);
        bounds[3] = bounds[3].max(p.y);
        any = true;
    }
    if !any {
        bounds = [0.0; 4];
    }
    outline.bounds = bounds;
    Ok(outline)
}

/// Truncations inside a glyph record mean the record is malformed, not the
/// file short.
fn malformed(error: Error, glyph_id: u16) -> Error {
    match error {
        Error::Truncated { .. } => Error::MalformedGlyph {
            glyph: glyph_id,
            reason: "truncated glyph record",
        },
        other => other,
    }
}

fn decode_into(
    container: &Container,
    glyph_id: u16,
    depth: u32,
    out: &mut Vec<Contour>,
    hint: &mut Option<[f32; 4]>,
) -> Result<()> {
    if depth > MAX_COMPOSITE_DEPTH {
        return Err(Error::MalformedGlyph {
            glyph: glyph_id,
            reason: "composite depth",
        });
    }
    let Some(data) = container.glyph_data(glyph_id)? else {
        return Ok(()); // empty glyph: zero contours, metrics still apply
    };

    let mut s = data.stream_at(0);
    let contour_count = s.read_i16().map_err(|e| malformed(e, glyph_id))?;
    s.skip(8).map_err(|e| malformed(e, glyph_id))?; // bounding box

    if contour_count >= 0 {
        let contours = decode_simple(&mut s, contour_count as usize, glyph_id)
            .map_err(|e| malformed(e, glyph_id))?;
        out.extend(contours);
        Ok(())
    } else {
        decode_composite(container, &mut s, glyph_id, depth, out, hint)
    }
}

fn decode_simple(s: &mut Stream, contour_count: usize, glyph_id: u16) -> Result<Vec<Contour>> {
    if contour_count == 0 {
        return Ok(Vec::new());
    }

    let mut end_points = Vec::with_capacity(contour_count);
    for _ in 0..contour_count {
        end_points.push(s.read_u16()? as usize);
    }
    let point_count = match end_points.last() {
        Some(&last) => last + 1,
        None => return Ok(Vec::new()),
    };

    let instruction_len = s.read_u16()? as usize;
    s.skip(instruction_len)?;

    let mut flags = Vec::with_capacity(point_count);
    while flags.len() < point_count {
        let flag = s.read_u8()?;
        flags.push(flag);
        if flag & REPEAT != 0 {
            let repeat = s.read_u8()? as usize;
            if flags.len() + repeat > point_count {
                return Err(Error::MalformedGlyph {
                    glyph: glyph_id,
                    reason: "flag repeat overflows point count",
                });
            }
            flags.extend(std::iter::repeat(flag).take(repeat));
        }
    }

    let xs = decode_deltas(s, &flags, X_SHORT, X_SAME_OR_POSITIVE)?;
    let ys = decode_deltas(s, &flags, Y_SHORT, Y_SAME_OR_POSITIVE)?;

    let mut contours = Vec::with_capacity(contour_count);
    let mut start = 0usize;
    for &end in &end_points {
        if end + 1 <= start || end >= point_count {
            return Err(Error::MalformedGlyph {
                glyph: glyph_id,
                reason: "contour end points not increasing",
            });
        }
        let contour = (start..=end)
            .map(|i| GlyphPoint {
                x: xs[i] as f32,
                y: ys[i] as f32,
                on_curve: flags[i] & ON_CURVE != 0,
            })
            .collect();
        contours.push(contour);
        start = end + 1;
    }
    Ok(contours)
}

/// Reconstructs one coordinate axis as a running sum of per-point deltas.
fn decode_deltas(s: &mut Stream, flags: &[u8], short_bit: u8, same_bit: u8) -> Result<Vec<i32>> {
    let mut values = Vec::with_capacity(flags.len());
    let mut value = 0i32;
    for &flag in flags {
        value += match (flag & short_bit != 0, flag & same_bit != 0) {
            // Short sector: one unsigned byte, sign carried by the same bit.
            (true, true) => s.read_u8()? as i32,
            (true, false) => -(s.read_u8()? as i32),
            // Long sector: "same" means a zero delta.
            (false, true) => 0,
            (false, false) => s.read_i16()? as i32,
        };
        values.push(value);
    }
    Ok(values)
}

fn decode_composite(
    container: &Container,
    s: &mut Stream,
    glyph_id: u16,
    depth: u32,
    out: &mut Vec<Contour>,
    hint: &mut Option<[f32; 4]>,
) -> Result<()> {
    loop {
        let flags = s.read_u16().map_err(|e| malformed(e, glyph_id))?;
        let component_id = s.read_u16().map_err(|e| malformed(e, glyph_id))?;
        if component_id >= container.num_glyphs() {
            return Err(Error::MalformedGlyph {
                glyph: glyph_id,
                reason: "component glyph index out of range",
            });
        }

        let (dx, dy) = (|| -> Result<(f32, f32)> {
            if flags & ARGS_ARE_XY_VALUES != 0 {
                if flags & ARG_1_AND_2_ARE_WORDS != 0 {
                    Ok((s.read_i16()? as f32, s.read_i16()? as f32))
                } else {
                    Ok((s.read_i8()? as f32, s.read_i8()? as f32))
                }
            } else {
                // Anchored attachment by point indices: recognized, skipped,
                // no translation contributed.
                let arg_len = if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
                s.skip(arg_len)?;
                Ok((0.0, 0.0))
            }
        })()
        .map_err(|e| malformed(e, glyph_id))?;

        let transform = (|| -> Result<[f32; 4]> {
            let f2dot14 = |s: &mut Stream| -> Result<f32> {
                Ok(s.read_i16()? as f32 / 16384.0)
            };
            if flags & WE_HAVE_A_SCALE != 0 {
                let scale = f2dot14(s)?;
                Ok([scale, 0.0, 0.0, scale])
            } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
                Ok([f2dot14(s)?, 0.0, 0.0, f2dot14(s)?])
            } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
                Ok([f2dot14(s)?, f2dot14(s)?, f2dot14(s)?, f2dot14(s)?])
            } else {
                Ok(IDENTITY)
            }
        })()
        .map_err(|e| malformed(e, glyph_id))?;

        if hint.is_none() && transform != IDENTITY {
            *hint = Some(transform);
        }

        let mut component = Vec::new();
        decode_into(container, component_id, depth + 1, &mut component, hint)?;
        let [xx, xy, yx, yy] = transform;
        for contour in &mut component {
            for p in contour.iter_mut() {
                let (x, y) = (p.x, p.y);
                p.x = xx * x + yx * y + dx;
                p.y = xy * x + yy * y + dy;
            }
        }
        out.append(&mut component);

        if flags & MORE_COMPONENTS == 0 {
            // Trailing instructions, when present, are never read.
            break;
        }
    }
    Ok(())
}
