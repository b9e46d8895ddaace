//! Image encoding: `DynamicImage` → PNG bytes.
//!
//! Tesseract (through leptonica) reads encoded images from memory, so every
//! rasterised page is handed over as a PNG. PNG is lossless; JPEG artefacts
//! around small CJK glyphs measurably hurt recognition.

use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} page → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}
