//! Decoding uploaded bytes into a pixel buffer.

use image::RgbImage;

use crate::error::{Error, Result};

/// Decode raw uploaded bytes into an RGB pixel buffer.
///
/// The codec is picked by content sniffing, so anything the `image` crate
/// recognizes (JPEG, PNG, WebP, ...) is accepted. The buffer is converted
/// to 8-bit RGB regardless of the source channel layout.
///
/// # Errors
///
/// Returns [`Error::ImageDecode`] if the bytes are not a decodable image
/// and [`Error::EmptyImage`] if the decoded image has no pixels. Both are
/// request-level failures; validating here keeps malformed uploads from
/// surfacing deep inside the colorspace and resize stages.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(|source| Error::ImageDecode { source })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }

    Ok(rgb)
}
