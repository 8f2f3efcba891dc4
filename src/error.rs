//! Custom error types for recolor.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the recolor library.
#[derive(Error, Debug)]
pub enum Error {
    /// Uploaded bytes did not decode to a valid image.
    #[error("failed to decode uploaded image: {source}")]
    ImageDecode {
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode the result image.
    #[error("failed to encode result image: {source}")]
    ImageEncode {
        #[source]
        source: image::ImageError,
    },

    /// Decoded image has no pixels.
    #[error("decoded image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Failed to load the ONNX network.
    #[error("failed to load model from {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ort::Error,
    },

    /// Failed to read the ab cluster-centroid table.
    #[error("failed to read centroid table from {path}: {source}")]
    CentroidTable {
        path: PathBuf,
        #[source]
        source: ndarray_npy::ReadNpyError,
    },

    /// Centroid table has the wrong shape.
    #[error("centroid table at {path} has shape {rows}x{cols}, expected 313x2")]
    CentroidShape {
        path: PathBuf,
        rows: usize,
        cols: usize,
    },

    /// Model inference failed.
    #[error("model inference failed: {source}")]
    Inference {
        #[source]
        source: ort::Error,
    },

    /// Shape mismatch in tensor operations.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for recolor operations.
pub type Result<T> = std::result::Result<T, Error>;
