//! Glyph metrics tables.

use crate::error::Result;
use crate::parse::Bytes;

/// Horizontal metrics for one glyph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HMetric {
    pub advance: u16,
    pub lsb: i16,
}

/// Expands `hmtx` into one metric per glyph.
///
/// The table stores `num_long_metrics` full records followed by a bare side
/// bearing per remaining glyph; the tail inherits the last advance.
pub fn horizontal_metrics(
    table: Bytes,
    num_long_metrics: u16,
    num_glyphs: u16,
) -> Result<Vec<HMetric>> {
    let long = num_long_metrics.min(num_glyphs) as usize;
    let mut metrics = Vec::with_capacity(num_glyphs as usize);

    let mut advance = 0;
    for i in 0..long {
        advance = table.read_u16(i * 4)?;
        let lsb = table.read_i16(i * 4 + 2)?;
        metrics.push(HMetric { advance, lsb });
    }
    for i in long..num_glyphs as usize {
        let lsb = table.read_i16(long * 4 + (i - long) * 2)?;
        metrics.push(HMetric { advance, lsb });
    }

    Ok(metrics)
}
