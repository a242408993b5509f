use serde::{Deserialize, Serialize};

use crate::error::WarpError;

/// Number of tie points that define a perspective transform.
pub const TIE_POINT_COUNT: usize = 4;

/// Number of reals in the flat tie point layout.
pub const TIE_POINT_VALUES: usize = 4 * TIE_POINT_COUNT;

/// A correspondence between a location in the output and a location in the input.
///
/// `target` is where the point lands in the output image, `source` is where
/// it is read from in the input image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiePoint {
    /// Location in the input image as `[x, y]`.
    pub source: [f64; 2],
    /// Location in the output image as `[x, y]`.
    pub target: [f64; 2],
}

impl TiePoint {
    /// Create a tie point from a source and a target location.
    pub fn new(source: [f64; 2], target: [f64; 2]) -> Self {
        Self { source, target }
    }

    /// The same correspondence read in the other direction.
    pub fn inverted(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }
}

/// Exactly four tie points.
///
/// The set only guarantees the count. Geometric validity (no three collinear
/// points, no duplicates) is checked by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiePointSet([TiePoint; TIE_POINT_COUNT]);

impl TiePointSet {
    /// Create a set from four tie points.
    pub fn new(points: [TiePoint; TIE_POINT_COUNT]) -> Self {
        Self(points)
    }

    /// Parse the flat layout `4 x (target_x, target_y, source_x, source_y)`.
    ///
    /// # Errors
    ///
    /// Returns [`WarpError::InvalidTiePointCount`] unless `values` holds
    /// exactly 16 reals.
    ///
    /// # Example
    ///
    /// ```
    /// use quadwarp_imgproc::warp::TiePointSet;
    ///
    /// let tiepoints = TiePointSet::from_slice(&[
    ///     0.0, 0.0, 10.0, 5.0,
    ///     1.0, 0.0, 11.0, 5.0,
    ///     0.0, 1.0, 10.0, 6.0,
    ///     1.0, 1.0, 11.0, 6.0,
    /// ]).unwrap();
    ///
    /// assert_eq!(tiepoints.points()[1].target, [1.0, 0.0]);
    /// assert_eq!(tiepoints.points()[1].source, [11.0, 5.0]);
    /// assert!(TiePointSet::from_slice(&[0.0; 15]).is_err());
    /// ```
    pub fn from_slice(values: &[f64]) -> Result<Self, WarpError> {
        if values.len() != TIE_POINT_VALUES {
            return Err(WarpError::InvalidTiePointCount(values.len()));
        }

        Ok(Self(std::array::from_fn(|i| {
            let v = &values[4 * i..4 * i + 4];
            TiePoint {
                target: [v[0], v[1]],
                source: [v[2], v[3]],
            }
        })))
    }

    /// The four tie points in input order.
    pub fn points(&self) -> &[TiePoint; TIE_POINT_COUNT] {
        &self.0
    }

    /// Swap source and target of every tie point.
    ///
    /// Solving the inverted set gives the forward transform, input to output.
    pub fn inverted(&self) -> Self {
        Self(self.0.map(|p| p.inverted()))
    }

    /// The flat layout accepted by [`TiePointSet::from_slice`].
    pub fn to_flat(&self) -> [f64; TIE_POINT_VALUES] {
        let mut flat = [0.0; TIE_POINT_VALUES];
        for (chunk, p) in flat.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&[p.target[0], p.target[1], p.source[0], p.source[1]]);
        }
        flat
    }
}

impl TryFrom<&[f64]> for TiePointSet {
    type Error = WarpError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

impl From<[TiePoint; TIE_POINT_COUNT]> for TiePointSet {
    fn from(points: [TiePoint; TIE_POINT_COUNT]) -> Self {
        Self::new(points)
    }
}
