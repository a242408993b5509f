//! Perspective distortion driven by four tie points.
//!
//! The pipeline runs in stages, each a plain function over owned fields:
//!
//! 1. [`TiePointSet`] parses the 16 input reals.
//! 2. [`HomographySolver`] fits the eight coefficients of a [`TransformVector`].
//! 3. The engine generates the integer coordinate grid of the output.
//! 4. [`evaluate_projective`] maps the grid through the coefficients.
//! 5. [`assemble_displacement_map`] interleaves the result into a [`DisplacementMap`].
//! 6. The engine remaps the input through the map.
//!
//! [`distort_perspective`] runs all of them.

mod displacement;
mod homography;
mod perspective;
mod projective;
mod tiepoints;

pub use displacement::{assemble_displacement_map, DisplacementMap};
pub use homography::{HomographySolver, TransformVector};
pub use perspective::{displacement_map, distort_perspective};
pub use projective::evaluate_projective;
pub use tiepoints::{TiePoint, TiePointSet, TIE_POINT_COUNT, TIE_POINT_VALUES};
