//! The pretrained colorization network.
//!
//! The network takes a single mean-centered 224x224 lightness plane and
//! produces per-pixel scores over 313 quantized ab-chrominance bins at its
//! native output resolution. The scores are turned into ab values by the
//! decode head in this module: rebalance by a fixed scale, softmax over the
//! bins, then mix the pretrained 313x2 cluster-centroid table under the
//! resulting distribution. ONNX Runtime sessions are immutable after load,
//! so the decode constants live next to the session instead of inside the
//! graph; the arithmetic matches the Scale -> Softmax -> 1x1-conv tail of
//! the released model.

mod loader;

pub use loader::ColorizationNet;

use ndarray::{Array2, Array3, Array4};

use crate::error::{Error, Result};

/// Spatial input size the network was trained with.
pub const INPUT_SIZE: usize = 224;

/// Number of quantized ab-chrominance bins.
pub const AB_BINS: usize = 313;

/// Mean lightness subtracted from the input plane (training statistic).
pub const L_MEAN: f32 = 50.0;

/// Class-rebalancing scale applied to the scores before the softmax.
pub const REBALANCE_SCALE: f32 = 2.606;

/// Forward-pass capability of a chrominance predictor.
///
/// The one seam between the pipeline and the inference library; tests
/// substitute a stub implementation.
pub trait ChromaModel: Send + Sync {
    /// Predict ab chrominance from a mean-centered lightness plane.
    ///
    /// `lightness` must be [`INPUT_SIZE`] x [`INPUT_SIZE`], already centered
    /// by subtracting [`L_MEAN`]. The result is a channel-last
    /// `(height, width, 2)` ab tensor at the model's native output
    /// resolution, which is generally smaller than the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input shape is wrong or inference fails.
    fn predict_ab(&self, lightness: &Array2<f32>) -> Result<Array3<f32>>;
}

/// Turn per-pixel bin scores into ab values.
///
/// Scores are scaled by [`REBALANCE_SCALE`], softmaxed over the bin axis,
/// and used as mixture weights over the centroid table.
fn mix_centroids(scores: &Array4<f32>, centroids: &Array2<f32>) -> Result<Array3<f32>> {
    let (batch, bins, height, width) = scores.dim();

    if batch != 1 || bins != centroids.nrows() {
        return Err(Error::ShapeMismatch {
            expected: format!("1x{}xHxW class scores", centroids.nrows()),
            actual: format!("{batch}x{bins}x{height}x{width}"),
        });
    }

    let mut ab = Array3::<f32>::zeros((height, width, 2));
    let mut weights = vec![0.0f32; bins];

    for y in 0..height {
        for x in 0..width {
            let mut max = f32::NEG_INFINITY;
            for k in 0..bins {
                weights[k] = scores[[0, k, y, x]] * REBALANCE_SCALE;
                max = max.max(weights[k]);
            }

            let mut denom = 0.0;
            for w in &mut weights {
                *w = (*w - max).exp();
                denom += *w;
            }

            for (k, w) in weights.iter().enumerate() {
                let p = w / denom;
                ab[[y, x, 0]] += p * centroids[[k, 0]];
                ab[[y, x, 1]] += p * centroids[[k, 1]];
            }
        }
    }

    Ok(ab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_bin_table() -> Array2<f32> {
        array![[-10.0, 5.0], [10.0, -5.0]]
    }

    #[test]
    fn test_uniform_scores_give_centroid_mean() {
        let scores = Array4::<f32>::zeros((1, 2, 3, 3));
        let ab = mix_centroids(&scores, &two_bin_table()).unwrap();

        assert_eq!(ab.dim(), (3, 3, 2));
        for y in 0..3 {
            for x in 0..3 {
                assert!(ab[[y, x, 0]].abs() < 1e-5);
                assert!(ab[[y, x, 1]].abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_dominant_score_selects_centroid() {
        let mut scores = Array4::<f32>::zeros((1, 2, 1, 1));
        scores[[0, 0, 0, 0]] = 100.0;

        let ab = mix_centroids(&scores, &two_bin_table()).unwrap();

        assert!((ab[[0, 0, 0]] - (-10.0)).abs() < 1e-3);
        assert!((ab[[0, 0, 1]] - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_bin_count_mismatch_rejected() {
        let scores = Array4::<f32>::zeros((1, 5, 2, 2));
        let err = mix_centroids(&scores, &two_bin_table()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
