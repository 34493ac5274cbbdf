//! Field transport codec.
//!
//! Scalar fields cross the process boundary as base64-encoded single-channel
//! PNG rasters, optionally wrapped in a data URL. Decoding tolerates the
//! prefix; encoding always emits one.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::GrayImage;

use crate::error::GenerationError;
use crate::raster::Raster;

/// Decode an encoded field payload into a luminance field in [0, 1].
pub fn decode_field(payload: &str) -> Result<Raster<f64>, GenerationError> {
    // Strip a data-URL prefix if present.
    let payload = payload
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or(payload);

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| GenerationError::Internal(format!("invalid base64 field payload: {e}")))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| GenerationError::Internal(format!("undecodable field image: {e}")))?;

    let luma = img.to_luma8();
    let (width, height) = (luma.width() as usize, luma.height() as usize);
    if width == 0 || height == 0 {
        return Err(GenerationError::Internal("empty field image".to_string()));
    }

    let mut field = Raster::new_with(width, height, 0.0f64);
    for (x, y, pixel) in luma.enumerate_pixels() {
        field.set(x as usize, y as usize, pixel.0[0] as f64 / 255.0);
    }

    Ok(field)
}

/// Encode a field as a base64 grayscale PNG data URL.
///
/// Values are min-max normalized to the 8-bit range first, so the payload
/// is portable regardless of the field's native range.
pub fn encode_field(field: &Raster<f64>) -> Result<String, GenerationError> {
    let img = field_to_gray_image(field);

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .map_err(|e| GenerationError::Internal(format!("field png encoding failed: {e}")))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&buffer)))
}

/// Render a field as an 8-bit grayscale image, normalized to full range.
pub fn field_to_gray_image(field: &Raster<f64>) -> GrayImage {
    let normalized = field.normalized();
    let mut img = GrayImage::new(field.width as u32, field.height as u32);
    for (x, y, &v) in normalized.iter() {
        img.put_pixel(x as u32, y as u32, image::Luma([(v * 255.0).round() as u8]));
    }
    img
}
