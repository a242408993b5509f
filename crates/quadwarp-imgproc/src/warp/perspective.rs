use log::debug;

use quadwarp_image::{Image, ImageSize};

use crate::config::WarpConfig;
use crate::engine::ImageEngine;
use crate::error::WarpError;

use super::displacement::{assemble_displacement_map, DisplacementMap};
use super::homography::{HomographySolver, TransformVector};
use super::projective::evaluate_projective;
use super::tiepoints::TiePointSet;

/// Build the displacement map of `coeffs` for an output of the given size.
///
/// Every output pixel `(col, row)` is sent through the projective map; the
/// result is where that pixel samples the input.
///
/// # Errors
///
/// Fails when the size is empty.
pub fn displacement_map<E: ImageEngine>(
    engine: &E,
    coeffs: &TransformVector,
    size: ImageSize,
) -> Result<DisplacementMap, WarpError> {
    let grid = engine.coordinate_grid(size)?;
    let x = engine.extract_band(&grid, 0)?;
    let y = engine.extract_band(&grid, 1)?;

    let (map_x, map_y) = evaluate_projective(engine, coeffs, &x, &y)?;

    assemble_displacement_map(engine, &map_x, &map_y)
}

/// Distort an image so that each tie point's source lands on its target.
///
/// The coefficients are solved from `tiepoints` as the map from output to
/// input coordinates, so every pixel of `dst` reads exactly one location of
/// `src`. Locations with no sample are handled by `config.border`.
///
/// # Arguments
///
/// * `engine` - The engine running the field operations and the remap.
/// * `src` - The input image with shape (height, width, C).
/// * `dst` - The output image; its size decides the size of the coordinate fields.
/// * `tiepoints` - The four correspondences.
/// * `config` - Sampling policy and solver tolerances.
///
/// # Errors
///
/// * [`WarpError::DegenerateTransform`] when the tie points do not define a
///   perspective transform.
/// * An image error when `src` or `dst` is empty.
///
/// # Example
///
/// ```
/// use quadwarp_image::Image;
/// use quadwarp_imgproc::config::WarpConfig;
/// use quadwarp_imgproc::engine::CpuEngine;
/// use quadwarp_imgproc::interpolation::InterpolationMode;
/// use quadwarp_imgproc::warp::{distort_perspective, TiePointSet};
///
/// let src = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 2.0, 3.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val([3, 1].into(), 0.0).unwrap();
///
/// // read every output pixel one column to the right
/// let tiepoints = TiePointSet::from_slice(&[
///     0.0, 0.0, 1.0, 0.0,
///     2.0, 0.0, 3.0, 0.0,
///     0.0, 1.0, 1.0, 1.0,
///     2.0, 1.0, 3.0, 1.0,
/// ]).unwrap();
///
/// let config = WarpConfig {
///     interpolation: InterpolationMode::Nearest,
///     ..Default::default()
/// };
///
/// let engine = CpuEngine::default();
/// distort_perspective(&engine, &src, &mut dst, &tiepoints, &config).unwrap();
/// assert_eq!(dst.as_slice(), &[2.0, 3.0, 0.0]);
/// ```
pub fn distort_perspective<E: ImageEngine, const C: usize>(
    engine: &E,
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    tiepoints: &TiePointSet,
    config: &WarpConfig,
) -> Result<(), WarpError> {
    let coeffs = HomographySolver::new(config.solver).solve(tiepoints)?;

    let map = displacement_map(engine, &coeffs, dst.size())?;
    debug!(
        "distort {} -> {} with {:?}",
        src.size(),
        dst.size(),
        config.interpolation
    );

    engine.remap(src, dst, &map, config.interpolation, config.border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::CpuEngine;
    use crate::interpolation::{BorderMode, InterpolationMode};

    #[test]
    fn distort_perspective_shift() -> Result<(), Box<dyn std::error::Error>> {
        let engine = CpuEngine::startup(EngineConfig::default())?;
        let image = Image::<f32, 2>::new(
            [3, 2].into(),
            vec![0.0, 10.0, 1.0, 11.0, 2.0, 12.0, 3.0, 13.0, 4.0, 14.0, 5.0, 15.0],
        )?;

        // output pixel (x, y) reads input pixel (x - 1, y)
        let tiepoints = TiePointSet::from_slice(&[
            1.0, 0.0, 0.0, 0.0, //
            3.0, 0.0, 2.0, 0.0, //
            1.0, 1.0, 0.0, 1.0, //
            3.0, 1.0, 2.0, 1.0, //
        ])?;

        let config = WarpConfig {
            border: BorderMode::Constant(-1.0),
            ..Default::default()
        };
        let mut dst = Image::<f32, 2>::from_size_val(image.size(), 0.0)?;
        distort_perspective(&engine, &image, &mut dst, &tiepoints, &config)?;

        let expected = [-1.0, -1.0, 0.0, 10.0, 1.0, 11.0, -1.0, -1.0, 3.0, 13.0, 4.0, 14.0];
        for (a, b) in dst.as_slice().iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-4, "{a} != {b}");
        }

        let nearest = WarpConfig {
            interpolation: InterpolationMode::Nearest,
            ..config
        };
        distort_perspective(&engine, &image, &mut dst, &tiepoints, &nearest)?;
        assert_eq!(dst.as_slice(), &expected);
        Ok(())
    }

    #[test]
    fn displacement_map_size() -> Result<(), WarpError> {
        let engine = CpuEngine::default();
        let size = ImageSize {
            width: 5,
            height: 2,
        };
        let map = displacement_map(&engine, &TransformVector::identity(), size)?;
        assert_eq!(map.size(), size);
        assert_eq!(map.get([1, 4, 0]), Some(&4.0));
        assert_eq!(map.get([1, 4, 1]), Some(&1.0));

        assert!(displacement_map(&engine, &TransformVector::identity(), [0, 2].into()).is_err());
        Ok(())
    }
}
