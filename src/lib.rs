//! # recolor
//!
//! An HTTP service that colorizes photographs with a pretrained
//! colorization network.
//!
//! An uploaded image is reduced to its CIE Lab lightness, a 224x224 copy
//! of that lightness drives the network, and the predicted ab chrominance
//! is resized back and composited with the original-resolution lightness.
//! The network is loaded once at startup and shared read-only across
//! requests.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> recolor::Result<()> {
//! let net = recolor::ColorizationNet::load(Path::new("models"))?;
//! let app = recolor::server::router(Arc::new(net));
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod error;
pub mod image;
pub mod model;
pub mod pipeline;
pub mod server;

pub use error::{Error, Result};
pub use model::{ChromaModel, ColorizationNet};
pub use pipeline::colorize;
