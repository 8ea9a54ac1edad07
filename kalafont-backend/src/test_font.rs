//! In-memory TrueType fixtures for unit tests.

/// Builds a minimal TrueType buffer around the given raw `glyf` records,
/// with long `loca` offsets, one long horizontal metric (advance 600) and
/// the requested units per em.
pub fn build(glyphs: &[Vec<u8>], units_per_em: u16) -> Vec<u8> {
    let tags: [&[u8; 4]; 6] = [b"glyf", b"head", b"hhea", b"hmtx", b"loca", b"maxp"];
    let num_glyphs = glyphs.len() as u16;

    let mut head = vec![0u8; 54];
    head[12..16].copy_from_slice(&0x5F0F3CF5u32.to_be_bytes());
    head[18..20].copy_from_slice(&units_per_em.to_be_bytes());
    head[50..52].copy_from_slice(&1i16.to_be_bytes()); // long loca

    let mut hhea = vec![0u8; 36];
    hhea[34..36].copy_from_slice(&1u16.to_be_bytes());

    let mut hmtx = vec![0u8; 4];
    hmtx[0..2].copy_from_slice(&600u16.to_be_bytes());
    hmtx.extend(std::iter::repeat(0u8).take(num_glyphs.saturating_sub(1) as usize * 2));

    let mut maxp = vec![0u8; 6];
    maxp[0..4].copy_from_slice(&0x00010000u32.to_be_bytes());
    maxp[4..6].copy_from_slice(&num_glyphs.to_be_bytes());

    let mut glyf = Vec::new();
    let mut loca = Vec::new();
    for glyph in glyphs {
        loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
        glyf.extend_from_slice(glyph);
    }
    loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());

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
