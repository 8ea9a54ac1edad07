//! The compile driver: argument validation, file I/O and orchestration.
//!
//! This is the only component that touches the filesystem. Everything is
//! validated and encoded in memory before the output path is written, so a
//! failing compile never leaves a partial file behind.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use kalafont_backend::bitmap::Rasterize;
use kalafont_backend::sfnt::{self, Container};
use kalafont_backend::{compile_font, glyf, Error as BackendError};

use crate::cli::{CompileArgs, Flavor};
use crate::rasterizer::AbGlyphRasterizer;

/// Largest input font accepted, in bytes.
pub const MAX_INPUT_BYTES: u64 = 1024 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Format(#[from] ktf::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;

fn invalid(message: String) -> DriverError {
    BackendError::InvalidArgument(message).into()
}

/// Lexically absolutizes a path against the current directory without
/// requiring it to exist.
fn canonical(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| DriverError::Backend(e.into()))
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn compile(args: &CompileArgs) -> Result<()> {
    let input = canonical(&args.input)?;
    let output = canonical(&args.output)?;
    validate_input(&input)?;
    validate_output(&output)?;

    info!(
        "compiling '{}' into '{}' ({:?} flavor, {} px, {}x supersampling)",
        input.display(),
        output.display(),
        args.flavor,
        args.glyph_height,
        args.super_sample
    );

    let data = fs::read(&input).map_err(BackendError::Io)?;
    check_scaler_matches_extension(&input, &data)?;

    // Both flavors decode the container; the bitmap path uses it only for
    // validation and the verbose dump.
    let container = Container::parse(&data)?;
    dump_container(&container)?;

    let bytes = match args.flavor {
        Flavor::Glyph => {
            let meshes = compile_font(&container)?;
            let file = ktf::glyph::GlyphFile {
                glyphs: meshes
                    .into_iter()
                    .map(|mesh| ktf::glyph::GlyphRecord {
                        glyph_id: mesh.glyph_id as u32,
                        advance: mesh.advance,
                        lsb: mesh.lsb,
                        anchor: mesh.anchor,
                        transform: mesh.transform,
                        vertices: mesh.vertices,
                        indices: mesh.indices,
                    })
                    .collect(),
            };
            ktf::CompiledFont::Glyph(file).encode()?
        }
        Flavor::Bitmap => {
            let blocks =
                AbGlyphRasterizer.rasterize(&input, args.glyph_height, args.super_sample)?;
            debug!("rasterizer delivered {} glyph blocks", blocks.len());
            let mut glyphs = Vec::with_capacity(blocks.len());
            for block in blocks {
                glyphs.push(ktf::bitmap::GlyphBlock::new(
                    block.codepoint,
                    block.width,
                    block.height,
                    block.bearing_x,
                    block.bearing_y,
                    block.advance,
                    block.pixels,
                )?);
            }
            let file = ktf::bitmap::BitmapFile {
                glyph_height: args.glyph_height,
                glyphs,
            };
            ktf::CompiledFont::Bitmap(file).encode()?
        }
    };

    fs::write(&output, &bytes).map_err(BackendError::Io)?;
    info!("finished compiling: wrote {} bytes", bytes.len());
    Ok(())
}

/// Prints a summary of an already compiled file.
pub fn info(path: &Path) -> Result<()> {
    let path = canonical(path)?;
    if !path.is_file() {
        return Err(invalid(format!(
            "compiled font '{}' does not exist or is not a regular file",
            path.display()
        )));
    }
    if extension_of(&path) != ktf::EXTENSION {
        return Err(invalid(format!(
            "compiled font '{}' must have the .ktf extension",
            path.display()
        )));
    }

    let data = fs::read(&path).map_err(BackendError::Io)?;
    if data.starts_with(b"KFNT") {
        let file = ktf::glyph::GlyphFile::decode(&data)?;
        info!(
            "'{}': glyph flavor, {} meshes",
            path.display(),
            file.glyphs.len()
        );
        for glyph in &file.glyphs {
            debug!(
                "glyph {}: {} vertices, {} triangles, advance {:.3}",
                glyph.glyph_id,
                glyph.vertices.len() / 2,
                glyph.indices.len() / 3,
                glyph.advance
            );
        }
    } else {
        let file = ktf::bitmap::BitmapFile::decode(&data)?;
        let coverage: usize = file.glyphs.iter().map(|g| g.pixels.len()).sum();
        info!(
            "'{}': bitmap flavor, {} glyphs at {} px, {} coverage bytes",
            path.display(),
            file.glyphs.len(),
            file.glyph_height,
            coverage
        );
    }
    Ok(())
}

fn validate_input(path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => {
            return Err(invalid(format!(
                "input font '{}' does not exist",
                path.display()
            )))
        }
    };
    if !metadata.is_file() {
        return Err(invalid(format!(
            "input font '{}' is not a regular file",
            path.display()
        )));
    }
    if !matches!(extension_of(path).as_str(), "ttf" | "otf") {
        return Err(invalid(format!(
            "input font '{}' must have a .ttf or .otf extension",
            path.display()
        )));
    }
    if metadata.len() > MAX_INPUT_BYTES {
        return Err(invalid(format!(
            "input font '{}' is larger than the 1 GiB limit",
            path.display()
        )));
    }
    Ok(())
}

fn validate_output(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(invalid(format!(
            "target path '{}' already exists",
            path.display()
        )));
    }
    if extension_of(path) != ktf::EXTENSION {
        return Err(invalid(format!(
            "target path '{}' must have the .ktf extension",
            path.display()
        )));
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let writable = fs::metadata(parent)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false);
    if !writable {
        return Err(invalid(format!(
            "target directory '{}' is not writable",
            parent.display()
        )));
    }
    Ok(())
}

/// The first four bytes must agree with the extension: a `.ttf` opens with
/// the TrueType scaler, a `.otf` with either scaler.
fn check_scaler_matches_extension(path: &Path, data: &[u8]) -> Result<()> {
    let scaler = match data.get(..4) {
        Some(bytes) => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        None => return Err(BackendError::Truncated { offset: 0 }.into()),
    };
    let ok = match extension_of(path).as_str() {
        "ttf" => scaler == sfnt::TRUETYPE,
        _ => scaler == sfnt::TRUETYPE || scaler == sfnt::OTTO,
    };
    if !ok {
        return Err(invalid(format!(
            "input font '{}' does not carry a scaler type matching its extension",
            path.display()
        )));
    }
    Ok(())
}

/// Verbose dump of the decoded container, mirroring what `vp` prints.
fn dump_container(container: &Container) -> Result<()> {
    for record in &container.records {
        let tag: String = record
            .tag
            .to_be_bytes()
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { ' ' })
            .collect();
        debug!(
            "table '{tag}' at offset {} with length {}",
            record.offset, record.length
        );
    }
    let head = &container.head;
    debug!(
        "head: {} units per em, bounds ({}, {}) to ({}, {}), {:?} loca",
        head.units_per_em, head.x_min, head.y_min, head.x_max, head.y_max, head.loca_format
    );
    debug!("maxp: {} glyphs", container.num_glyphs());
    debug!(
        "hhea: ascender {}, descender {}, {} long metrics",
        container.hhea.ascender, container.hhea.descender, container.hhea.num_long_metrics
    );

    let shown = (container.loca.len()).min(10);
    for i in 0..shown {
        if let Some(offset) = container.loca.offset(i) {
            debug!("loca[{i}] = {offset}");
        }
    }
    for glyph_id in 0..container.num_glyphs().min(10) {
        match glyf::read_header(container, glyph_id)? {
            Some(header) => debug!(
                "glyph {glyph_id}: {} contours, bounds ({}, {}) to ({}, {})",
                header.contour_count, header.x_min, header.y_min, header.x_max, header.y_max
            ),
            None => debug!("glyph {glyph_id}: empty"),
        }
    }
    Ok(())
}
