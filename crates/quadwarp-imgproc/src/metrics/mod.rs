//! Image comparison metrics.
//!
//! Used to compare a distortion result against a reference image.

mod mse;

pub use mse::mse;
