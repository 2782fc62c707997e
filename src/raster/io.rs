use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::error::{SynthError, SynthResult},
    raster::channels::{CompactImage, RawImage},
};

/// Decode an image file and expand it to RGBA8.
pub fn load_raw(path: &Path) -> SynthResult<RawImage> {
    let dyn_img = image::open(path)
        .map_err(|e| SynthError::io(format!("failed to load '{}'\n{e}", path.display())))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RawImage::new(width, height, rgba.into_raw())
}

/// Decode encoded image bytes and expand them to RGBA8.
pub fn decode_raw(bytes: &[u8]) -> SynthResult<RawImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RawImage::new(width, height, rgba.into_raw())
}

/// Write a 1-4 channel image as PNG, creating the parent directory when needed.
pub fn save_png(path: &Path, img: &CompactImage) -> SynthResult<()> {
    let color = match img.channels() {
        1 => image::ColorType::L8,
        2 => image::ColorType::La8,
        3 => image::ColorType::Rgb8,
        4 => image::ColorType::Rgba8,
        n => {
            return Err(SynthError::io(format!(
                "cannot write a {n}-channel image as png"
            )));
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        path,
        img.as_bytes(),
        img.width(),
        img.height(),
        color,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/io.rs"]
mod tests;
