use faer::prelude::SpSolver;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::WarpError;

use super::tiepoints::{TiePoint, TiePointSet};

/// The eight coefficients `[A, B, C, D, E, F, G, H]` of a projective map.
///
/// A point `(x, y)` maps to
///
/// ```text
/// X = (A*x + B*y + C) / (G*x + H*y + 1)
/// Y = (D*x + E*y + F) / (G*x + H*y + 1)
/// ```
///
/// The ninth matrix entry is fixed to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformVector([f64; 8]);

impl TransformVector {
    /// Wrap eight coefficients.
    pub fn new(coefficients: [f64; 8]) -> Self {
        Self(coefficients)
    }

    /// The identity map.
    pub fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0])
    }

    /// The coefficients `[A, B, C, D, E, F, G, H]`.
    pub fn coefficients(&self) -> &[f64; 8] {
        &self.0
    }

    /// Row-major 3x3 matrix with the implied `I = 1` appended.
    pub fn to_matrix3(&self) -> [f64; 9] {
        let [a, b, c, d, e, f, g, h] = self.0;
        [a, b, c, d, e, f, g, h, 1.0]
    }

    /// Normalize a row-major 3x3 matrix so its last entry is 1.
    ///
    /// # Errors
    ///
    /// Fails with [`WarpError::DegenerateTransform`] when the last entry is
    /// zero or any entry is not finite; such a matrix has no 8 coefficient form.
    pub fn from_matrix3(m: &[f64; 9]) -> Result<Self, WarpError> {
        let scale = m[8];
        if scale == 0.0 || m.iter().any(|v| !v.is_finite()) {
            return Err(WarpError::DegenerateTransform {
                column: 8,
                pivot: scale.abs(),
            });
        }
        Ok(Self(std::array::from_fn(|i| m[i] / scale)))
    }

    /// Map a single point.
    ///
    /// The result is not finite when the point lies on the line `G*x + H*y + 1 = 0`.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f, g, h] = self.0;
        let w = g * x + h * y + 1.0;
        ((a * x + b * y + c) / w, (d * x + e * y + f) / w)
    }
}

impl Default for TransformVector {
    fn default() -> Self {
        Self::identity()
    }
}

/// Similarity moving the centroid of four points to the origin and their
/// mean distance from it to `sqrt(2)`.
#[derive(Debug, Clone, Copy)]
struct Normalization {
    scale: f64,
    cx: f64,
    cy: f64,
}

impl Normalization {
    /// `None` when all points coincide.
    fn fit(points: [[f64; 2]; 4]) -> Option<Self> {
        let cx = points.iter().map(|p| p[0]).sum::<f64>() / 4.0;
        let cy = points.iter().map(|p| p[1]).sum::<f64>() / 4.0;

        let mean_dist = points
            .iter()
            .map(|p| (p[0] - cx).hypot(p[1] - cy))
            .sum::<f64>()
            / 4.0;

        let scale = std::f64::consts::SQRT_2 / mean_dist;
        if mean_dist > 0.0 && scale.is_finite() {
            Some(Self { scale, cx, cy })
        } else {
            None
        }
    }

    fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [(p[0] - self.cx) * self.scale, (p[1] - self.cy) * self.scale]
    }

    fn matrix(&self) -> [f64; 9] {
        let s = self.scale;
        [s, 0.0, -s * self.cx, 0.0, s, -s * self.cy, 0.0, 0.0, 1.0]
    }

    fn inverse_matrix(&self) -> [f64; 9] {
        let s = 1.0 / self.scale;
        [s, 0.0, self.cx, 0.0, s, self.cy, 0.0, 0.0, 1.0]
    }
}

fn matmul33(a: &[f64; 9], b: &[f64; 9]) -> [f64; 9] {
    std::array::from_fn(|i| {
        let (row, col) = (i / 3, i % 3);
        (0..3).map(|k| a[3 * row + k] * b[3 * k + col]).sum()
    })
}

fn det33(m: &[f64; 9]) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
        + m[2] * (m[3] * m[7] - m[4] * m[6])
}

/// Solves the 8x8 linear system that fits a [`TransformVector`] to four tie points.
///
/// For every tie point with target `(x, y)` and source `(u, v)` the system
/// holds the rows
///
/// ```text
/// [x, y, 1, 0, 0, 0, -x*u, -y*u] . c = u
/// [0, 0, 0, x, y, 1, -x*v, -y*v] . c = v
/// ```
///
/// so the solution maps output coordinates to input coordinates.
///
/// Before the system is built both point sets are normalized: each is
/// translated to its centroid and scaled to a mean distance of `sqrt(2)`.
/// The coefficients are mapped back afterwards, so the tolerances in
/// [`SolverConfig`] judge the shape of the quads and not their size.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomographySolver {
    config: SolverConfig,
}

impl HomographySolver {
    /// Create a solver with the given tolerances.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The tolerances used by the solver.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Build the system matrix `M` and right-hand side `b`.
    ///
    /// Rows 0..4 hold the `u` equations and rows 4..8 the `v` equations, in
    /// tie point order.
    pub fn build_system(tiepoints: &TiePointSet) -> ([[f64; 8]; 8], [f64; 8]) {
        let mut m = [[0.0; 8]; 8];
        let mut b = [0.0; 8];

        for (i, tp) in tiepoints.points().iter().enumerate() {
            let TiePoint {
                target: [x, y],
                source: [u, v],
            } = *tp;
            m[i] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u];
            m[i + 4] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v];
            b[i] = u;
            b[i + 4] = v;
        }

        (m, b)
    }

    /// Solve for the map from target to source coordinates.
    ///
    /// # Errors
    ///
    /// Fails with [`WarpError::DegenerateTransform`] when the conditioning of
    /// the tie points is at or below `singular_tolerance`, when a tie point
    /// value is not finite or when the solution is not finite. Solves whose
    /// conditioning is below `warn_tolerance` succeed but are logged.
    pub fn solve(&self, tiepoints: &TiePointSet) -> Result<TransformVector, WarpError> {
        let (coeffs, conditioning) = self.solve_normalized(tiepoints)?;

        if conditioning < self.config.warn_tolerance {
            warn!(
                "nearly degenerate tie points, conditioning {conditioning:e}: {:?}",
                tiepoints.to_flat()
            );
        }

        debug!("solved perspective coefficients {:?}", coeffs.coefficients());
        Ok(coeffs)
    }

    /// Conditioning of the normalized system, in `(0, 1]`.
    ///
    /// The smaller of the smallest LU pivot relative to the largest entry of
    /// the normalized `M` and `|det H| / |H|^3` of the normalized 3x3 matrix.
    /// Uniformly scaling or translating all tie points leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Fails like [`HomographySolver::solve`] when the system is degenerate.
    pub fn conditioning(&self, tiepoints: &TiePointSet) -> Result<f64, WarpError> {
        Ok(self.solve_normalized(tiepoints)?.1)
    }

    fn solve_normalized(
        &self,
        tiepoints: &TiePointSet,
    ) -> Result<(TransformVector, f64), WarpError> {
        let points = tiepoints.points();
        let tolerance = self.config.singular_tolerance;

        if points
            .iter()
            .flat_map(|p| p.target.iter().chain(p.source.iter()))
            .any(|v| !v.is_finite())
        {
            return Err(WarpError::DegenerateTransform {
                column: 0,
                pivot: f64::NAN,
            });
        }

        let (Some(norm_target), Some(norm_source)) = (
            Normalization::fit(points.map(|p| p.target)),
            Normalization::fit(points.map(|p| p.source)),
        ) else {
            return Err(WarpError::DegenerateTransform {
                column: 0,
                pivot: 0.0,
            });
        };

        let normalized = TiePointSet::new(points.map(|p| {
            TiePoint::new(norm_source.apply(p.source), norm_target.apply(p.target))
        }));
        let (m, b) = Self::build_system(&normalized);
        let scale = m.iter().flatten().fold(0.0f64, |acc, v| acc.max(v.abs()));

        let lu = faer::Mat::<f64>::from_fn(8, 8, |i, j| m[i][j]).partial_piv_lu();
        let u = lu.compute_u();

        let mut conditioning = f64::INFINITY;
        for column in 0..8 {
            let pivot = u.read(column, column).abs() / scale;
            // NaN fails the comparison too
            if !(pivot > tolerance) {
                return Err(WarpError::DegenerateTransform { column, pivot });
            }
            conditioning = conditioning.min(pivot);
        }

        let solution = lu.solve(faer::Mat::<f64>::from_fn(8, 1, |i, _| b[i]));
        let h = solution.col(0);
        let normalized_matrix = TransformVector(std::array::from_fn(|i| h[i])).to_matrix3();

        // a rank deficient map passes the pivot test once the points are centered
        let norm = normalized_matrix.iter().map(|v| v * v).sum::<f64>().sqrt();
        let det_ratio = det33(&normalized_matrix).abs() / norm.powi(3);
        if !(det_ratio > tolerance) {
            return Err(WarpError::DegenerateTransform {
                column: 8,
                pivot: det_ratio,
            });
        }
        conditioning = conditioning.min(det_ratio);

        let matrix = matmul33(
            &matmul33(&norm_source.inverse_matrix(), &normalized_matrix),
            &norm_target.matrix(),
        );

        Ok((TransformVector::from_matrix3(&matrix)?, conditioning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tiepoints(values: [f64; 16]) -> TiePointSet {
        TiePointSet::from_slice(&values).unwrap()
    }

    fn assert_maps_targets_to_sources(set: &TiePointSet, coeffs: &TransformVector, epsilon: f64) {
        for p in set.points() {
            let (u, v) = coeffs.transform_point(p.target[0], p.target[1]);
            assert_relative_eq!(u, p.source[0], epsilon = epsilon, max_relative = 1e-9);
            assert_relative_eq!(v, p.source[1], epsilon = epsilon, max_relative = 1e-9);
        }
    }

    #[test]
    fn build_system_rows() {
        let set = tiepoints([
            1.0, 2.0, 3.0, 4.0, //
            5.0, 6.0, 7.0, 8.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, //
        ]);
        let (m, b) = HomographySolver::build_system(&set);
        assert_eq!(m[0], [1.0, 2.0, 1.0, 0.0, 0.0, 0.0, -3.0, -6.0]);
        assert_eq!(m[4], [0.0, 0.0, 0.0, 1.0, 2.0, 1.0, -4.0, -8.0]);
        assert_eq!(m[1], [5.0, 6.0, 1.0, 0.0, 0.0, 0.0, -35.0, -42.0]);
        assert_eq!(b, [3.0, 7.0, 0.0, 0.0, 4.0, 8.0, 0.0, 0.0]);
    }

    #[test]
    fn solve_identity() -> Result<(), WarpError> {
        let set = tiepoints([
            0.0, 0.0, 0.0, 0.0, //
            7.0, 0.0, 7.0, 0.0, //
            0.0, 5.0, 0.0, 5.0, //
            7.0, 5.0, 7.0, 5.0, //
        ]);
        let coeffs = HomographySolver::default().solve(&set)?;
        for (c, e) in coeffs.coefficients().iter().zip(TransformVector::identity().coefficients()) {
            assert_relative_eq!(*c, *e, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn solve_maps_targets_to_sources() -> Result<(), WarpError> {
        let set = tiepoints([
            0.0, 0.0, 1.0, 2.0, //
            31.0, 0.0, 28.0, 3.0, //
            0.0, 23.0, 3.0, 20.0, //
            31.0, 23.0, 30.0, 22.0, //
        ]);
        let coeffs = HomographySolver::default().solve(&set)?;
        assert_maps_targets_to_sources(&set, &coeffs, 1e-9);
        Ok(())
    }

    #[test]
    fn solve_rejects_degenerate() {
        let solver = HomographySolver::default();

        let collinear = tiepoints([
            0.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 10.0, 0.0, //
            2.0, 0.0, 0.0, 10.0, //
            1.0, 1.0, 10.0, 10.0, //
        ]);
        assert!(matches!(
            solver.solve(&collinear),
            Err(WarpError::DegenerateTransform { .. })
        ));

        // three sources on the x axis
        let collinear_sources = tiepoints([
            0.0, 0.0, 0.0, 0.0, //
            10.0, 0.0, 1.0, 0.0, //
            0.0, 10.0, 2.0, 0.0, //
            10.0, 10.0, 1.0, 1.0, //
        ]);
        assert!(matches!(
            solver.solve(&collinear_sources),
            Err(WarpError::DegenerateTransform { .. })
        ));

        let duplicate = tiepoints([
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 1.0, //
            5.0, 0.0, 5.0, 0.0, //
            0.0, 5.0, 0.0, 5.0, //
        ]);
        assert!(matches!(
            solver.solve(&duplicate),
            Err(WarpError::DegenerateTransform { .. })
        ));

        let coincident = tiepoints([
            3.0, 3.0, 0.0, 0.0, //
            3.0, 3.0, 1.0, 0.0, //
            3.0, 3.0, 0.0, 1.0, //
            3.0, 3.0, 1.0, 1.0, //
        ]);
        assert_eq!(
            solver.solve(&coincident),
            Err(WarpError::DegenerateTransform {
                column: 0,
                pivot: 0.0
            })
        );

        let mut values = [
            0.0, 0.0, 0.0, 0.0, 7.0, 0.0, 7.0, 0.0, 0.0, 5.0, 0.0, 5.0, 7.0, 5.0, 7.0, 5.0,
        ];
        values[6] = f64::NAN;
        assert!(matches!(
            solver.solve(&tiepoints(values)),
            Err(WarpError::DegenerateTransform { column: 0, .. })
        ));
    }

    #[test]
    fn conditioning_ignores_scale() -> Result<(), WarpError> {
        let solver = HomographySolver::default();
        // 5% keystone of a 640x480 frame
        let keystone = [
            [0.0, 0.0, 31.95, 0.0],
            [639.0, 0.0, 607.05, 0.0],
            [0.0, 479.0, 0.0, 479.0],
            [639.0, 479.0, 639.0, 479.0],
        ];

        let mut reference = None;
        for scale in [1.0, 100.0, 1e4] {
            let values: Vec<f64> = keystone.iter().flatten().map(|v| v * scale).collect();
            let set = TiePointSet::from_slice(&values)?;

            let conditioning = solver.conditioning(&set)?;
            assert!(conditioning > solver.config().warn_tolerance);
            let reference = *reference.get_or_insert(conditioning);
            assert_relative_eq!(conditioning, reference, max_relative = 1e-9);

            let coeffs = solver.solve(&set)?;
            assert_maps_targets_to_sources(&set, &coeffs, 1e-9 * scale);
        }
        Ok(())
    }

    #[test]
    fn nearly_collinear_is_solved_with_a_warning() -> Result<(), WarpError> {
        let _ = env_logger::builder().is_test(true).try_init();

        // the third target sits 1e-6 off the line through the first two
        let set = tiepoints([
            0.0, 0.0, 1.0, 0.0, //
            10.0, 0.0, 11.0, 0.5, //
            20.0, 1e-6, 21.0, 1.000001, //
            10.0, 10.0, 11.0, 10.0, //
        ]);

        let defaults = SolverConfig::default();
        let conditioning = HomographySolver::default().conditioning(&set)?;
        assert!(conditioning < defaults.warn_tolerance);
        assert!(conditioning > defaults.singular_tolerance);

        // below warn_tolerance: logged and solved
        let coeffs = HomographySolver::default().solve(&set)?;
        assert_maps_targets_to_sources(&set, &coeffs, 1e-6);

        // quiet once the warning threshold is lowered
        let quiet = HomographySolver::new(SolverConfig {
            warn_tolerance: conditioning / 10.0,
            ..defaults
        });
        assert!(quiet.solve(&set).is_ok());

        // rejected once the hard threshold is raised above it
        let strict = HomographySolver::new(SolverConfig {
            singular_tolerance: conditioning * 10.0,
            ..defaults
        });
        assert!(matches!(
            strict.solve(&set),
            Err(WarpError::DegenerateTransform { .. })
        ));
        Ok(())
    }

    #[test]
    fn matrix3_conversions() -> Result<(), WarpError> {
        let t = TransformVector::new([2.0, 0.0, 1.0, 0.0, 2.0, -1.0, 0.0, 0.0]);
        assert_eq!(t.to_matrix3(), [2.0, 0.0, 1.0, 0.0, 2.0, -1.0, 0.0, 0.0, 1.0]);

        let scaled =
            TransformVector::from_matrix3(&[4.0, 0.0, 2.0, 0.0, 4.0, -2.0, 0.0, 0.0, 2.0])?;
        assert_eq!(scaled, t);

        let no_affine_part = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        assert!(TransformVector::from_matrix3(&no_affine_part).is_err());
        Ok(())
    }

    #[test]
    fn normalization_round_trip() {
        let points = [[2.0, 1.0], [12.0, 1.0], [2.0, 9.0], [12.0, 9.0]];
        let norm = Normalization::fit(points).unwrap();

        let centered = points.map(|p| norm.apply(p));
        let mean_dist = centered.iter().map(|p| p[0].hypot(p[1])).sum::<f64>() / 4.0;
        assert_relative_eq!(mean_dist, std::f64::consts::SQRT_2, epsilon = 1e-12);

        let product = matmul33(&norm.inverse_matrix(), &norm.matrix());
        for (a, b) in product.iter().zip([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0].iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        assert_relative_eq!(det33(&norm.matrix()), norm.scale * norm.scale, epsilon = 1e-12);

        assert!(Normalization::fit([[1.0, 1.0]; 4]).is_none());
    }

    #[test]
    fn transform_point_on_horizon() {
        let t = TransformVector::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0]);
        let (x, y) = t.transform_point(1.0, 2.0);
        assert!(!x.is_finite());
        assert!(!y.is_finite());
    }
}
