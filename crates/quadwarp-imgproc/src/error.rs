use quadwarp_image::ImageError;
use quadwarp_tensor::TensorError;
use quadwarp_tensor_ops::TensorOpsError;
use thiserror::Error;

/// An error type for the perspective warp pipeline.
#[derive(Error, Debug, PartialEq)]
pub enum WarpError {
    /// The tie point sequence does not hold exactly 4 x (target_x, target_y, source_x, source_y).
    #[error("Expected 16 tie point values (4 x [target_x, target_y, source_x, source_y]), got {0}")]
    InvalidTiePointCount(usize),

    /// The linear system built from the tie points is singular or numerically unstable.
    ///
    /// Happens when three or more tie points are collinear, when points
    /// coincide, or when a tie point value is not finite.
    #[error("Degenerate perspective transform: pivot {pivot:e} in column {column} is below tolerance")]
    DegenerateTransform {
        /// Column of the elimination step that failed, 8 for a rank deficient map.
        column: usize,
        /// Rejected pivot or determinant, relative to the normalized system.
        pivot: f64,
    },

    /// Two fields that must be combined elementwise have different shapes.
    #[error("Shape mismatch: {0:?} != {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Image container error.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// Tensor error.
    #[error(transparent)]
    TensorError(#[from] TensorError),

    /// Field operation error.
    #[error(transparent)]
    TensorOpsError(#[from] TensorOpsError),
}
