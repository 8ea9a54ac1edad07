//! End-to-end compiles of synthetic in-memory fonts.

use kalafont_backend::error::Error;
use kalafont_backend::sfnt::{self, Container};
use kalafont_backend::{compile_font, compile_glyph, glyf};

const ON_CURVE: u8 = 0x01;

/// Builds a TrueType buffer with long `loca` offsets around raw `glyf`
/// records. `head_magic` and `loca_override` allow corrupting individual
/// tables without touching the rest of the file.
fn build_font(
    glyphs: &[Vec<u8>],
    units_per_em: u16,
    head_magic: u32,
    loca_override: Option<Vec<u32>>,
) -> Vec<u8> {
    let tags: [&[u8; 4]; 6] = [b"glyf", b"head", b"hhea", b"hmtx", b"loca", b"maxp"];
    let num_glyphs = glyphs.len() as u16;

    let mut head = vec![0u8; 54];
    head[12..16].copy_from_slice(&head_magic.to_be_bytes());
    head[18..20].copy_from_slice(&units_per_em.to_be_bytes());
    head[50..52].copy_from_slice(&1i16.to_be_bytes());

    let mut hhea = vec![0u8; 36];
    hhea[34..36].copy_from_slice(&1u16.to_be_bytes());

    let mut hmtx = vec![0u8; 4];
    hmtx[0..2].copy_from_slice(&600u16.to_be_bytes());
    hmtx.extend(std::iter::repeat(0u8).take(num_glyphs.saturating_sub(1) as usize * 2));

    let mut maxp = vec![0u8; 6];
    maxp[0..4].copy_from_slice(&0x00010000u32.to_be_bytes());
    maxp[4..6].copy_from_slice(&num_glyphs.to_be_bytes());

    let mut glyf = Vec::new();
    let mut offsets = Vec::new();
    for glyph in glyphs {
        offsets.push(glyf.len() as u32);
        glyf.extend_from_slice(glyph);
    }
    offsets.push(glyf.len() as u32);
    if let Some(forced) = loca_override {
        offsets = forced;
    }
    let loca: Vec<u8> = offsets.iter().flat_map(|v| v.to_be_bytes()).collect();

    let tables = [&glyf, &head, &hhea, &hmtx, &loca, &maxp];
    let mut data = Vec::new();
    data.extend_from_slice(&0x00010000u32.to_be_bytes());
    data.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    data.extend_from_slice(&[0u8; 6]);
    let mut offset = 12 + tables.len() * 16;
    for (tag, table) in tags.iter().zip(tables) {
        data.extend_from_slice(*tag);
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&(offset as u32).to_be_bytes());
        data.extend_from_slice(&(table.len() as u32).to_be_bytes());
        offset += table.len();
    }
    for table in tables {
        data.extend_from_slice(table);
    }
    data
}

/// Encodes a simple glyph from absolute on-curve coordinates, one slice per
/// contour.
fn simple_glyph(contours: &[&[(i16, i16)]]) -> Vec<u8> {
    let mut g = Vec::new();
    g.extend_from_slice(&(contours.len() as i16).to_be_bytes());
    g.extend_from_slice(&[0u8; 8]); // bounding box, unused by the decoder

    let mut end = 0u16;
    for contour in contours {
        end += contour.len() as u16;
        g.extend_from_slice(&(end - 1).to_be_bytes());
    }
    g.extend_from_slice(&0u16.to_be_bytes()); // no instructions

    let total: usize = contours.iter().map(|c| c.len()).sum();
    g.extend_from_slice(&vec![ON_CURVE; total]);

    let mut prev = 0i16;
    for contour in contours {
        for &(x, _) in *contour {
            g.extend_from_slice(&(x - prev).to_be_bytes());
            prev = x;
        }
    }
    let mut prev = 0i16;
    for contour in contours {
        for &(_, y) in *contour {
            g.extend_from_slice(&(y - prev).to_be_bytes());
            prev = y;
        }
    }
    g
}

const SQUARE: [(i16, i16); 4] = [(100, 100), (900, 100), (900, 900), (100, 900)];

#[test]
fn square_glyph_compiles_to_two_triangles() {
    let data = build_font(&[simple_glyph(&[&SQUARE])], 1000, 0x5F0F3CF5, None);
    let container = Container::parse(&data).unwrap();
    let mesh = compile_glyph(&container, 0).unwrap();

    assert_eq!(mesh.vertices.len() / 2, 4);
    assert_eq!(mesh.indices.len(), 6);
    for coord in &mesh.vertices {
        assert!(
            *coord == 0.1 || *coord == 0.9,
            "normalized coordinate {coord} outside the expected set"
        );
    }
}

#[test]
fn ring_glyph_keeps_the_frame_and_avoids_the_hole() {
    let inner: [(i16, i16); 4] = [(300, 300), (700, 300), (700, 700), (300, 700)];
    let data = build_font(
        &[simple_glyph(&[&SQUARE, &inner])],
        1000,
        0x5F0F3CF5,
        None,
    );
    let container = Container::parse(&data).unwrap();
    let mesh = compile_glyph(&container, 0).unwrap();

    assert_eq!(mesh.indices.len() / 3, 8);

    // Hole fidelity: no triangle centroid inside the inner square.
    for triangle in mesh.indices.chunks_exact(3) {
        let (mut cx, mut cy) = (0.0, 0.0);
        for &i in triangle {
            cx += mesh.vertices[i as usize * 2];
            cy += mesh.vertices[i as usize * 2 + 1];
        }
        let (cx, cy) = (cx / 3.0, cy / 3.0);
        let inside_hole = cx > 0.3 && cx < 0.7 && cy > 0.3 && cy < 0.7;
        assert!(!inside_hole, "triangle centroid ({cx}, {cy}) fell in the hole");
    }
}

#[test]
fn composite_transforms_each_component() {
    // Component 0 scaled by one half and shifted right by 1000 units, then
    // component 0 again untouched.
    let mut composite = Vec::new();
    composite.extend_from_slice(&(-1i16).to_be_bytes());
    composite.extend_from_slice(&[0u8; 8]);
    // words + xy values + scale + more components
    composite.extend_from_slice(&0x002Bu16.to_be_bytes());
    composite.extend_from_slice(&0u16.to_be_bytes());
    composite.extend_from_slice(&1000i16.to_be_bytes());
    composite.extend_from_slice(&0i16.to_be_bytes());
    composite.extend_from_slice(&8192i16.to_be_bytes()); // 0.5 in F2DOT14
    // words + xy values, final component
    composite.extend_from_slice(&0x0003u16.to_be_bytes());
    composite.extend_from_slice(&0u16.to_be_bytes());
    composite.extend_from_slice(&0i16.to_be_bytes());
    composite.extend_from_slice(&0i16.to_be_bytes());

    let data = build_font(
        &[simple_glyph(&[&SQUARE]), composite],
        1000,
        0x5F0F3CF5,
        None,
    );
    let container = Container::parse(&data).unwrap();

    let outline = glyf::decode(&container, 1).unwrap();
    let total: usize = outline.contours.iter().map(Vec::len).sum();
    assert_eq!(total, 8, "composite keeps the sum of component points");
    let scaled = &outline.contours[0];
    assert_eq!((scaled[0].x, scaled[0].y), (1050.0, 50.0));
    assert_eq!((scaled[2].x, scaled[2].y), (1450.0, 450.0));

    let mesh = compile_glyph(&container, 1).unwrap();
    assert_eq!(mesh.vertices.len() / 2, 8);
    assert_eq!(mesh.transform, [0.5, 0.0, 0.0, 0.5]);
    // Anchored composites may reach past the em square, but never past the
    // normalization envelope.
    for coord in &mesh.vertices {
        assert!(coord.abs() <= 2.0);
    }
}

#[test]
fn corrupt_head_magic_fails_typed() {
    let data = build_font(&[simple_glyph(&[&SQUARE])], 1000, 0, None);
    match Container::parse(&data) {
        Err(Error::MalformedTable(tag)) => assert_eq!(tag, sfnt::HEAD),
        other => panic!("expected malformed head, got {other:?}"),
    }
}

#[test]
fn non_monotone_loca_fails_typed() {
    let glyph = simple_glyph(&[&SQUARE]);
    let len = glyph.len() as u32;
    let data = build_font(&[glyph], 1000, 0x5F0F3CF5, Some(vec![len, 0]));
    match Container::parse(&data) {
        Err(Error::MalformedTable(tag)) => assert_eq!(tag, sfnt::LOCA),
        other => panic!("expected malformed loca, got {other:?}"),
    }
}

#[test]
fn otto_without_truetype_outlines_is_unsupported() {
    let mut data = build_font(&[simple_glyph(&[&SQUARE])], 1000, 0x5F0F3CF5, None);
    data[0..4].copy_from_slice(b"OTTO");
    // Hide the glyf table so only the CFF-style metadata remains.
    assert_eq!(&data[12..16], b"glyf");
    data[12..16].copy_from_slice(b"CFF ");
    match Container::parse(&data) {
        Err(Error::UnsupportedContainer(_)) => {}
        other => panic!("expected unsupported container, got {other:?}"),
    }
}

#[test]
fn mesh_caps_reject_oversized_glyphs() {
    // 2049 disjoint little squares: 8196 vertices, over the 8192 cap.
    let mut contours: Vec<Vec<(i16, i16)>> = Vec::new();
    for i in 0..2049i16 {
        let (x, y) = (i % 46 * 16, i / 46 * 16);
        contours.push(vec![(x, y), (x + 8, y), (x + 8, y + 8), (x, y + 8)]);
    }
    let borrowed: Vec<&[(i16, i16)]> = contours.iter().map(|c| c.as_slice()).collect();
    let data = build_font(&[simple_glyph(&borrowed)], 1000, 0x5F0F3CF5, None);
    let container = Container::parse(&data).unwrap();
    match compile_glyph(&container, 0) {
        Err(Error::GlyphTooLarge(0)) => {}
        other => panic!("expected the glyph cap to trip, got {other:?}"),
    }
}

#[test]
fn bounds_safety_over_every_truncation() {
    let data = build_font(
        &[simple_glyph(&[&SQUARE]), simple_glyph(&[&SQUARE])],
        1000,
        0x5F0F3CF5,
        None,
    );
    // Whatever prefix of the file we hand in, the decoder must fail with a
    // typed error rather than panic.
    for len in 0..data.len() {
        if let Ok(container) = Container::parse(&data[..len]) {
            let _ = compile_font(&container);
        }
    }
}

#[test]
fn empty_glyphs_are_dropped_but_metrics_survive() {
    let data = build_font(
        &[Vec::new(), simple_glyph(&[&SQUARE])],
        1000,
        0x5F0F3CF5,
        None,
    );
    let container = Container::parse(&data).unwrap();

    let empty = compile_glyph(&container, 0).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.advance, 0.6);

    let meshes = compile_font(&container).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].glyph_id, 1);
}

#[test]
fn meshes_round_trip_through_the_compiled_file() {
    let inner: [(i16, i16); 4] = [(300, 300), (700, 300), (700, 700), (300, 700)];
    let data = build_font(
        &[simple_glyph(&[&SQUARE]), simple_glyph(&[&SQUARE, &inner])],
        1000,
        0x5F0F3CF5,
        None,
    );
    let container = Container::parse(&data).unwrap();
    let meshes = compile_font(&container).unwrap();

    let file = ktf::glyph::GlyphFile {
        glyphs: meshes
            .iter()
            .map(|m| ktf::glyph::GlyphRecord {
                glyph_id: m.glyph_id as u32,
                advance: m.advance,
                lsb: m.lsb,
                anchor: m.anchor,
                transform: m.transform,
                vertices: m.vertices.clone(),
                indices: m.indices.clone(),
            })
            .collect(),
    };
    let bytes = ktf::CompiledFont::Glyph(file.clone()).encode().unwrap();
    let back = ktf::glyph::GlyphFile::decode(&bytes).unwrap();

    assert_eq!(back.glyphs.len(), meshes.len());
    for (a, b) in back.glyphs.iter().zip(&file.glyphs) {
        assert_eq!(a, b);
    }
}
