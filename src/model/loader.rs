//! Loading the ONNX network and its centroid table.

use std::fs::File;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use ndarray::{Array2, Array3, Array4, Axis};
use ndarray_npy::ReadNpyExt;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{Error, Result};

use super::{mix_centroids, ChromaModel, AB_BINS, INPUT_SIZE};

/// ONNX artifact holding the network topology and weights.
pub const MODEL_FILE: &str = "colorization.onnx";

/// Float32 npy table of the 313 ab cluster centers.
pub const CENTROID_FILE: &str = "pts_in_hull.npy";

/// The pretrained colorization network, loaded once at startup.
///
/// Immutable after construction and shared read-only across requests.
/// `ort::Session::run` takes `&mut self`, so forward passes are serialized
/// behind a mutex while preprocessing and postprocessing of concurrent
/// requests stay parallel.
pub struct ColorizationNet {
    session: Mutex<Session>,
    centroids: Array2<f32>,
}

impl ColorizationNet {
    /// Load the network from a model directory containing
    /// [`MODEL_FILE`] and [`CENTROID_FILE`].
    ///
    /// # Errors
    ///
    /// Returns an error if either artifact is missing or malformed. This
    /// is fatal at startup: the process must not serve requests with a
    /// partially initialized model.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);

        tracing::info!("loading network from {}", model_path.display());
        let session = Session::builder()
            .map_err(|source| Error::ModelLoad {
                path: model_path.clone(),
                source,
            })?
            .commit_from_file(&model_path)
            .map_err(|source| Error::ModelLoad {
                path: model_path.clone(),
                source,
            })?;

        let centroid_path = model_dir.join(CENTROID_FILE);
        tracing::info!("loading centroid table from {}", centroid_path.display());
        let centroids = load_centroids(&centroid_path)?;

        Ok(Self {
            session: Mutex::new(session),
            centroids,
        })
    }
}

impl ChromaModel for ColorizationNet {
    fn predict_ab(&self, lightness: &Array2<f32>) -> Result<Array3<f32>> {
        let (height, width) = lightness.dim();
        if height != INPUT_SIZE || width != INPUT_SIZE {
            return Err(Error::ShapeMismatch {
                expected: format!("{INPUT_SIZE}x{INPUT_SIZE} lightness plane"),
                actual: format!("{height}x{width}"),
            });
        }

        // NCHW input: (1, 1, 224, 224)
        let input = lightness
            .to_owned()
            .insert_axis(Axis(0))
            .insert_axis(Axis(0));

        let input_value =
            Tensor::from_array(input).map_err(|source| Error::Inference { source })?;

        // A poisoned lock only means another forward pass panicked; the
        // session itself holds no crate-side invariants.
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|source| Error::Inference { source })?;

        let output = outputs
            .values()
            .next()
            .ok_or_else(|| Error::ShapeMismatch {
                expected: "class-score output".to_string(),
                actual: "no output".to_string(),
            })?;

        let scores = extract_array4(&output)?;

        mix_centroids(&scores, &self.centroids)
    }
}

/// Read and validate the 313x2 centroid table.
fn load_centroids(path: &Path) -> Result<Array2<f32>> {
    let file = File::open(path)?;

    let table = Array2::<f32>::read_npy(file).map_err(|source| Error::CentroidTable {
        path: path.to_path_buf(),
        source,
    })?;

    let (rows, cols) = table.dim();
    if rows != AB_BINS || cols != 2 {
        return Err(Error::CentroidShape {
            path: path.to_path_buf(),
            rows,
            cols,
        });
    }

    Ok(table)
}

/// Extract a 4D array from an ONNX value.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn extract_array4(value: &ort::value::ValueRef<'_>) -> Result<Array4<f32>> {
    let (shape_info, data) = value
        .try_extract_tensor::<f32>()
        .map_err(|source| Error::Inference { source })?;

    // Safe: tensor dimensions are always non-negative and within bounds
    let dims: Vec<usize> = shape_info.iter().map(|&x| x as usize).collect();

    if dims.len() != 4 {
        return Err(Error::ShapeMismatch {
            expected: "4D tensor".to_string(),
            actual: format!("{}D tensor", dims.len()),
        });
    }

    Array4::from_shape_vec((dims[0], dims[1], dims[2], dims[3]), data.to_vec()).map_err(|_| {
        Error::ShapeMismatch {
            expected: format!("{dims:?}"),
            actual: "reshape failed".to_string(),
        }
    })
}
