//! CIE Lab colorspace representation and conversion.
//!
//! The pipeline works on planar Lab data: lightness in [0, 100] and ab
//! chrominance roughly in [-128, 127], matching what the colorization
//! network was trained on. Conversion goes through linear sRGB with a D65
//! white point.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Rgb, RgbImage};
use ndarray::Array2;
use palette::{IntoColor, Lab, LinSrgb, Srgb};

/// A planar image in CIE Lab space.
///
/// Each plane is a `height x width` array of `f32` samples.
pub struct LabImage {
    /// Lightness, [0, 100].
    pub l: Array2<f32>,
    /// Green-red chrominance.
    pub a: Array2<f32>,
    /// Blue-yellow chrominance.
    pub b: Array2<f32>,
}

impl LabImage {
    /// Convert an 8-bit RGB buffer to planar Lab.
    ///
    /// Samples are normalized from [0, 255] to [0.0, 1.0] before the
    /// colorspace conversion.
    #[must_use]
    pub fn from_rgb(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let (w, h) = (width as usize, height as usize);

        let mut l = Array2::<f32>::zeros((h, w));
        let mut a = Array2::<f32>::zeros((h, w));
        let mut b = Array2::<f32>::zeros((h, w));

        #[allow(clippy::cast_possible_truncation)]
        for y in 0..h {
            for x in 0..w {
                let pixel = img.get_pixel(x as u32, y as u32);
                let srgb = Srgb::new(
                    f32::from(pixel[0]) / 255.0,
                    f32::from(pixel[1]) / 255.0,
                    f32::from(pixel[2]) / 255.0,
                );
                let lab: Lab = srgb.into_linear().into_color();

                l[[y, x]] = lab.l;
                a[[y, x]] = lab.a;
                b[[y, x]] = lab.b;
            }
        }

        Self { l, a, b }
    }

    /// Plane width in pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u32 {
        self.l.ncols() as u32
    }

    /// Plane height in pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u32 {
        self.l.nrows() as u32
    }

    /// Resize all three planes with bilinear interpolation.
    #[must_use]
    pub fn resize(&self, width: u32, height: u32) -> Self {
        Self {
            l: resize_plane(&self.l, width, height),
            a: resize_plane(&self.a, width, height),
            b: resize_plane(&self.b, width, height),
        }
    }

    /// Convert planar Lab back to an 8-bit RGB buffer.
    ///
    /// Out-of-gamut values introduced by interpolation and the colorspace
    /// round trip are clamped to [0.0, 1.0] before quantization.
    #[must_use]
    pub fn to_rgb(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            let (ix, iy) = (x as usize, y as usize);
            let lab = Lab::new(self.l[[iy, ix]], self.a[[iy, ix]], self.b[[iy, ix]]);
            let lin: LinSrgb = lab.into_color();
            let rgb = Srgb::from_linear(lin);

            Rgb([quantize(rgb.red), quantize(rgb.green), quantize(rgb.blue)])
        })
    }
}

/// Resize a single `f32` plane with bilinear interpolation.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn resize_plane(plane: &Array2<f32>, width: u32, height: u32) -> Array2<f32> {
    let src: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_fn(
        plane.ncols() as u32,
        plane.nrows() as u32,
        |x, y| Luma([plane[[y as usize, x as usize]]]),
    );

    let resized = imageops::resize(&src, width, height, FilterType::Triangle);

    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        resized.get_pixel(x as u32, y as u32)[0]
    })
}

/// Quantize a [0, 1] sample to u8 with clamping.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(value: f32) -> u8 {
    // Safe: clamped to [0, 255] range before casting
    (value * 255.0).clamp(0.0, 255.0) as u8
}
