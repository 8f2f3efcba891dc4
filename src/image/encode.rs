//! Encoding the result buffer for the HTTP response.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::{Error, Result};

/// Encode an RGB pixel buffer as an in-memory JPEG.
///
/// # Errors
///
/// Returns [`Error::ImageEncode`] if encoding fails.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);

    img.write_with_encoder(encoder)
        .map_err(|source| Error::ImageEncode { source })?;

    Ok(out)
}
