//! Image decoding and encoding at the HTTP boundary.

mod decode;
mod encode;

pub use decode::decode_image;
pub use encode::encode_jpeg;

/// JPEG quality used for response bodies (1-100).
pub const JPEG_QUALITY: u8 = 95;
