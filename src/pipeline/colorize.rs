//! Luminance-to-color reconstruction around the pretrained network.

use image::RgbImage;
use ndarray::Axis;

use crate::color::{resize_plane, LabImage};
use crate::error::Result;
use crate::model::{ChromaModel, INPUT_SIZE, L_MEAN};

/// Colorize an image from its luminance alone.
///
/// The input is converted to Lab; a 224x224 copy of the lightness plane,
/// centered by subtracting the training mean, drives the network. The
/// predicted ab chrominance is resized back to the source dimensions and
/// composited with the lightness of the *original-resolution* Lab buffer
/// (the resize exists only to satisfy the network's fixed input size, and
/// the input's own chrominance is never read). The result has the same
/// dimensions as the input.
///
/// # Errors
///
/// Returns an error if inference fails or a tensor contract is violated.
#[allow(clippy::cast_possible_truncation)]
pub fn colorize(image: &RgbImage, model: &dyn ChromaModel) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    tracing::debug!("colorizing {width}x{height} image");

    let lab = LabImage::from_rgb(image);

    // Resized copy only drives inference
    let resized = lab.resize(INPUT_SIZE as u32, INPUT_SIZE as u32);
    let centered = resized.l - L_MEAN;

    let ab = model.predict_ab(&centered)?;

    let a = resize_plane(&ab.index_axis(Axis(2), 0).to_owned(), width, height);
    let b = resize_plane(&ab.index_axis(Axis(2), 1).to_owned(), width, height);

    let merged = LabImage { l: lab.l, a, b };

    Ok(merged.to_rgb())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use image::Rgb;
    use ndarray::{Array2, Array3};
    use palette::{IntoColor, Lab, LinSrgb, Srgb};
    use std::sync::Mutex;

    /// Stub predictor returning the same ab value everywhere.
    struct FlatChroma {
        a: f32,
        b: f32,
    }

    impl ChromaModel for FlatChroma {
        fn predict_ab(&self, lightness: &Array2<f32>) -> Result<Array3<f32>> {
            assert_eq!(lightness.dim(), (INPUT_SIZE, INPUT_SIZE));
            Ok(Array3::from_shape_fn((56, 56, 2), |(_, _, c)| {
                if c == 0 {
                    self.a
                } else {
                    self.b
                }
            }))
        }
    }

    /// Stub predictor that records the lightness plane it was given.
    struct Recording {
        seen: Mutex<Option<Array2<f32>>>,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                seen: Mutex::new(None),
            }
        }
    }

    impl ChromaModel for Recording {
        fn predict_ab(&self, lightness: &Array2<f32>) -> Result<Array3<f32>> {
            *self.seen.lock().unwrap() = Some(lightness.clone());
            Ok(Array3::zeros((56, 56, 2)))
        }
    }

    /// Build an image of a single Lab color.
    fn lab_image(width: u32, height: u32, l: f32, a: f32, b: f32) -> RgbImage {
        let lin: LinSrgb = Lab::new(l, a, b).into_color();
        let rgb: Srgb<f32> = Srgb::from_linear(lin);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pixel = Rgb([
            (rgb.red * 255.0).clamp(0.0, 255.0) as u8,
            (rgb.green * 255.0).clamp(0.0, 255.0) as u8,
            (rgb.blue * 255.0).clamp(0.0, 255.0) as u8,
        ]);
        RgbImage::from_pixel(width, height, pixel)
    }

    #[test]
    fn test_output_matches_input_dimensions() {
        let img = RgbImage::from_pixel(100, 50, Rgb([120, 90, 60]));
        let out = colorize(&img, &FlatChroma { a: 10.0, b: -10.0 }).unwrap();
        assert_eq!(out.dimensions(), (100, 50));
    }

    #[test]
    fn test_resolution_independence() {
        let model = FlatChroma { a: 5.0, b: 5.0 };
        for (w, h) in [(64, 48), (128, 96), (32, 24)] {
            let img = RgbImage::from_pixel(w, h, Rgb([80, 80, 80]));
            let out = colorize(&img, &model).unwrap();
            assert_eq!(out.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_extreme_aspect_ratio() {
        let img = RgbImage::from_pixel(2000, 10, Rgb([128, 128, 128]));
        let out = colorize(&img, &FlatChroma { a: 0.0, b: 0.0 }).unwrap();
        assert_eq!(out.dimensions(), (2000, 10));
    }

    #[test]
    fn test_neutral_prediction_preserves_lightness_and_drops_chroma() {
        // Saturated red in, neutral chrominance predicted: the output must
        // be gray at the input's lightness.
        let img = RgbImage::from_pixel(40, 40, Rgb([255, 0, 0]));
        let out = colorize(&img, &FlatChroma { a: 0.0, b: 0.0 }).unwrap();

        let in_lab = LabImage::from_rgb(&img);
        let out_lab = LabImage::from_rgb(&out);

        assert!((out_lab.l[[20, 20]] - in_lab.l[[20, 20]]).abs() < 1.0);
        assert!(out_lab.a[[20, 20]].abs() < 1.0);
        assert!(out_lab.b[[20, 20]].abs() < 1.0);
    }

    #[test]
    fn test_model_sees_only_lightness() {
        // Same lightness, opposite chrominance: the plane fed to the model
        // must be the same for both.
        let gray = lab_image(32, 32, 60.0, 0.0, 0.0);
        let tinted = lab_image(32, 32, 60.0, 25.0, -25.0);

        let rec_gray = Recording::new();
        colorize(&gray, &rec_gray).unwrap();
        let rec_tinted = Recording::new();
        colorize(&tinted, &rec_tinted).unwrap();

        let seen_gray = rec_gray.seen.lock().unwrap().take().unwrap();
        let seen_tinted = rec_tinted.seen.lock().unwrap().take().unwrap();

        for (g, t) in seen_gray.iter().zip(seen_tinted.iter()) {
            assert!((g - t).abs() < 1.0, "lightness drifted: {g} vs {t}");
        }
    }

    #[test]
    fn test_black_input_stays_black_and_is_deterministic() {
        let img = RgbImage::new(400, 300);
        let model = FlatChroma { a: 0.0, b: 0.0 };

        let first = colorize(&img, &model).unwrap();
        let second = colorize(&img, &model).unwrap();

        assert_eq!(first.dimensions(), (400, 300));
        for pixel in first.pixels() {
            assert!(pixel[0] < 3 && pixel[1] < 3 && pixel[2] < 3);
        }
        assert_eq!(first.as_raw(), second.as_raw());
    }
}
