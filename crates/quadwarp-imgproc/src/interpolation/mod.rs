//! Pixel interpolation and remapping.
//!
//! Sampling an image at fractional coordinates is the last stage of a
//! perspective distortion: every destination pixel reads the source at the
//! location stored in a displacement map.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: Fastest, uses nearest pixel value (no interpolation)
//! - **Bilinear**: Smooth linear interpolation between adjacent pixels
//!
//! # Border Modes
//!
//! - **Constant**: coordinates with no source sample get a fill value
//! - **Replicate**: out-of-range coordinates are clamped to the edge

mod bilinear;

/// Coordinate grid generation.
///
/// Functions for generating the integer coordinate fields that the
/// projective evaluator consumes.
pub mod grid;

pub(crate) mod interpolate;
mod nearest;
mod remap;

pub use interpolate::{interpolate_pixel, BorderMode, InterpolationMode};
pub use remap::{remap, remap_fields};
