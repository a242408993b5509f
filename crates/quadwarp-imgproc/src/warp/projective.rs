use log::debug;

use quadwarp_tensor::Tensor2;
use quadwarp_tensor_ops::ops::count_non_finite;

use crate::engine::ImageEngine;
use crate::error::WarpError;

use super::homography::TransformVector;

/// Evaluate a projective map over two coordinate fields.
///
/// Computes, per pixel,
///
/// ```text
/// X = (A*x + B*y + C) / (G*x + H*y + 1)
/// Y = (D*x + E*y + F) / (G*x + H*y + 1)
/// ```
///
/// with field operations only. Coefficients are rounded to `f32`.
///
/// A zero denominator produces an infinity or `NaN` at that pixel only; it
/// is reported at debug level and is not an error.
///
/// # Errors
///
/// Fails with [`WarpError::ShapeMismatch`] when `x` and `y` differ in shape.
pub fn evaluate_projective<E: ImageEngine>(
    engine: &E,
    coeffs: &TransformVector,
    x: &Tensor2<f32>,
    y: &Tensor2<f32>,
) -> Result<(Tensor2<f32>, Tensor2<f32>), WarpError> {
    if x.shape != y.shape {
        return Err(WarpError::ShapeMismatch(x.shape.to_vec(), y.shape.to_vec()));
    }

    let [a, b, c, d, e, f, g, h] = coeffs.coefficients().map(|v| v as f32);

    let numer_x = engine.add(engine.linear(x, a, c), &engine.linear(y, b, 0.0))?;
    let numer_y = engine.add(engine.linear(x, d, f), &engine.linear(y, e, 0.0))?;
    let denom = engine.add(engine.linear(x, g, 1.0), &engine.linear(y, h, 0.0))?;

    let map_x = engine.divide(numer_x, &denom)?;
    let map_y = engine.divide(numer_y, &denom)?;

    let non_finite = count_non_finite(&map_x).max(count_non_finite(&map_y));
    if non_finite > 0 {
        debug!(
            "{non_finite} of {} pixels map to a non-finite location",
            map_x.numel()
        );
    }

    Ok((map_x, map_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::CpuEngine;
    use crate::interpolation::grid::meshgrid;
    use approx::assert_relative_eq;

    #[test]
    fn identity_fields() -> Result<(), Box<dyn std::error::Error>> {
        let engine = CpuEngine::default();
        let (x, y) = meshgrid(4, 5)?;
        let (mx, my) = evaluate_projective(&engine, &TransformVector::identity(), &x, &y)?;
        assert_eq!(mx, x);
        assert_eq!(my, y);
        Ok(())
    }

    #[test]
    fn translation_and_perspective() -> Result<(), Box<dyn std::error::Error>> {
        let engine = CpuEngine::startup(EngineConfig::default())?;
        let (x, y) = meshgrid(3, 3)?;

        let shift = TransformVector::new([1.0, 0.0, 5.0, 0.0, 1.0, 3.0, 0.0, 0.0]);
        let (mx, my) = evaluate_projective(&engine, &shift, &x, &y)?;
        assert_eq!(mx.get([2, 1]), Some(&6.0));
        assert_eq!(my.get([2, 1]), Some(&5.0));

        let t = TransformVector::new([2.0, 0.5, 1.0, -0.25, 1.5, 2.0, 0.1, 0.05]);
        let (mx, my) = evaluate_projective(&engine, &t, &x, &y)?;
        for r in 0..3 {
            for c in 0..3 {
                let (ex, ey) = t.transform_point(c as f64, r as f64);
                assert_relative_eq!(*mx.get_unchecked([r, c]), ex as f32, epsilon = 1e-5);
                assert_relative_eq!(*my.get_unchecked([r, c]), ey as f32, epsilon = 1e-5);
            }
        }
        Ok(())
    }

    #[test]
    fn zero_denominator_is_local() -> Result<(), Box<dyn std::error::Error>> {
        let engine = CpuEngine::default();
        let (x, y) = meshgrid(2, 3)?;
        // denominator 1 - x vanishes on column 1
        let t = TransformVector::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0]);
        let (mx, my) = evaluate_projective(&engine, &t, &x, &y)?;

        assert_eq!(count_non_finite(&mx), 2);
        assert!(mx.get_unchecked([0, 1]).is_infinite());
        assert!(my.get_unchecked([0, 1]).is_nan());
        assert_eq!(mx.get([0, 0]), Some(&0.0));
        assert_eq!(mx.get([1, 2]), Some(&-2.0));
        Ok(())
    }

    #[test]
    fn shape_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let engine = CpuEngine::default();
        let x = Tensor2::<f32>::zeros([2, 3]);
        let y = Tensor2::<f32>::zeros([3, 2]);
        assert_eq!(
            evaluate_projective(&engine, &TransformVector::identity(), &x, &y),
            Err(WarpError::ShapeMismatch(vec![2, 3], vec![3, 2]))
        );
        Ok(())
    }
}
