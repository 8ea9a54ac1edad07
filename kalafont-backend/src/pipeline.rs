//! Per-glyph compile pipeline.
//!
//! Runs outline decoding, flattening, fill classification, triangulation
//! and EM normalization for every glyph in a container, in ascending glyph
//! index order. A glyph whose triangulation cannot converge is dropped with
//! a warning; every other failure aborts the compile.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::{flatten, signed_area, triangulate, EPSILON};
use crate::glyf;
use crate::sfnt::Container;

/// Per-glyph cap on `(x, y)` vertex pairs.
pub const MAX_GLYPH_VERTICES: usize = 8192;
/// Per-glyph cap on triangle indices.
pub const MAX_GLYPH_INDICES: usize = 8192;

/// The pipeline output for one glyph, EM-normalized.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphMesh {
    pub glyph_id: u16,
    pub advance: f32,
    pub lsb: f32,
    /// Pen anchor `(lsb, 0)`.
    pub anchor: [f32; 2],
    /// Affine hint inherited from composite expansion; identity otherwise.
    pub transform: [f32; 4],
    /// Interleaved `(x, y)` coordinates.
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl GlyphMesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}

/// Compiles a single glyph to a normalized mesh.
pub fn compile_glyph(container: &Container, glyph_id: u16) -> Result<GlyphMesh> {
    let outline = glyf::decode(container, glyph_id)?;
    let metric = container.metric(glyph_id);

    let mut rings = Vec::with_capacity(outline.contours.len());
    for contour in &outline.contours {
        let ring = flatten::clean_ring(&flatten::flatten_contour(contour));
        // Rings without area cannot influence fill and would only poison
        // classification.
        if ring.len() >= 3 && signed_area(&ring) > EPSILON {
            rings.push(ring);
        }
    }

    let (points, indices) = triangulate::triangulate_rings(&rings, glyph_id)?;

    let upem = container.head.units_per_em as f32;
    let mut vertices = Vec::with_capacity(points.len() * 2);
    for p in &points {
        vertices.push(p.x / upem);
        vertices.push(p.y / upem);
    }
    if points.len() > MAX_GLYPH_VERTICES || indices.len() > MAX_GLYPH_INDICES {
        return Err(Error::GlyphTooLarge(glyph_id));
    }

    let advance = metric.advance as f32 / upem;
    let lsb = metric.lsb as f32 / upem;
    Ok(GlyphMesh {
        glyph_id,
        advance,
        lsb,
        anchor: [lsb, 0.0],
        transform: outline.transform,
        vertices,
        indices,
    })
}

/// Compiles every glyph in the container.
///
/// Returns the renderable meshes in ascending glyph index order; glyphs
/// with no geometry are skipped, degenerate glyphs are dropped with a
/// warning.
pub fn compile_font(container: &Container) -> Result<Vec<GlyphMesh>> {
    let num_glyphs = container.num_glyphs();
    let mut meshes = Vec::with_capacity(num_glyphs as usize);
    for glyph_id in 0..num_glyphs {
        match compile_glyph(container, glyph_id) {
            Ok(mesh) if mesh.is_empty() => {
                debug!("glyph {glyph_id} has no renderable geometry, skipping");
            }
            Ok(mesh) => meshes.push(mesh),
            Err(Error::DegenerateGlyph(glyph)) => {
                warn!("glyph {glyph} did not triangulate, dropping it");
            }
            Err(error) => return Err(error),
        }
    }
    debug!(
        "compiled {} of {} glyphs to meshes",
        meshes.len(),
        num_glyphs
    );
    Ok(meshes)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The container fixtures live with the outline decoder tests; here a
    // small hand-built font exercises the full pipeline.
    fn square_font() -> Vec<u8> {
        let mut glyph = Vec::new();
        glyph.extend_from_slice(&1i16.to_be_bytes());
        for v in [100i16, 100, 900, 900] {
            glyph.extend_from_slice(&v.to_be_bytes());
        }
        glyph.extend_from_slice(&3u16.to_be_bytes());
        glyph.extend_from_slice(&0u16.to_be_bytes());
        glyph.extend_from_slice(&[0x01; 4]);
        for delta in [100i16, 800, 0, -800] {
            glyph.extend_from_slice(&delta.to_be_bytes());
        }
        for delta in [100i16, 0, 800, 0] {
            glyph.extend_from_slice(&delta.to_be_bytes());
        }
        crate::test_font::build(&[Vec::new(), glyph], 1000)
    }

    #[test]
    fn square_glyph_normalizes_to_em_space() {
        let data = square_font();
        let container = Container::parse(&data).unwrap();
        let mesh = compile_glyph(&container, 1).unwrap();

        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 6);
        for coord in &mesh.vertices {
            assert!(*coord == 0.1 || *coord == 0.9, "unexpected {coord}");
        }
        assert_eq!(mesh.transform, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.advance, 0.6);
        assert_eq!(mesh.anchor, [mesh.lsb, 0.0]);
    }

    #[test]
    fn empty_glyphs_are_skipped_but_keep_order() {
        let data = square_font();
        let container = Container::parse(&data).unwrap();
        let meshes = compile_font(&container).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].glyph_id, 1);
    }

    #[test]
    fn mesh_indices_stay_in_range() {
        let data = square_font();
        let container = Container::parse(&data).unwrap();
        for mesh in compile_font(&container).unwrap() {
            assert_eq!(mesh.indices.len() % 3, 0);
            let vertex_count = (mesh.vertices.len() / 2) as u32;
            assert!(mesh.indices.iter().all(|&i| i < vertex_count));
        }
    }
}
