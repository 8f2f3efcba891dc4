//! The colorization pipeline.

mod colorize;

pub use colorize::colorize;
