#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
/// configuration of the warp pipeline and the engine.
pub mod config;

/// image engine handle and its capabilities.
pub mod engine;

/// error types for the warp pipeline.
pub mod error;

/// utilities for interpolation.
pub mod interpolation;

/// image comparison metrics module.
pub mod metrics;

/// module containing parallization utilities.
pub mod parallel;

/// perspective distortion module.
pub mod warp;

pub use error::WarpError;
