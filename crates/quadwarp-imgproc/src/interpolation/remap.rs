use crate::parallel;

use super::interpolate::{interpolate_pixel, BorderMode};
use super::InterpolationMode;
use quadwarp_image::{Image, ImageError};
use quadwarp_tensor::Tensor2;

/// Resample an image through a displacement map.
///
/// Pixel `(row, col)` of `dst` is sampled from `src` at the fractional
/// coordinate stored in `map[row, col]` (channel 0 = x, channel 1 = y).
///
/// # Arguments
///
/// * `src` - The input image container with shape (height, width, C).
/// * `dst` - The output image container with shape (height, width, C).
/// * `map` - The displacement map, same width and height as `dst`.
/// * `interpolation` - The interpolation mode to use.
/// * `border` - Policy for coordinates with no source sample.
///
/// # Errors
///
/// * The output image must have the same size as the map.
/// * The input image must not be empty.
pub fn remap<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    map: &Image<f32, 2>,
    interpolation: InterpolationMode,
    border: BorderMode,
) -> Result<(), ImageError> {
    if dst.size() != map.size() {
        return Err(ImageError::InvalidImageSize(
            map.rows(),
            map.cols(),
            dst.rows(),
            dst.cols(),
        ));
    }

    if src.rows() == 0 || src.cols() == 0 {
        return Err(ImageError::EmptyImage(src.cols(), src.rows()));
    }

    // parallelize the remap operation by rows
    parallel::par_iter_rows_resample(dst, map, |x, y, dst_pixel| {
        let pixel = interpolate_pixel(src, x, y, interpolation, border);
        dst_pixel.copy_from_slice(&pixel);
    });

    Ok(())
}

/// Resample an image through two separate coordinate fields.
///
/// Same contract as [`remap`] with `map_x` and `map_y` as the two channels
/// of the displacement map.
///
/// # Errors
///
/// * The mapx and mapy must have the same size.
/// * The output image must have the same size as the mapx and mapy.
pub fn remap_fields<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    map_x: &Tensor2<f32>,
    map_y: &Tensor2<f32>,
    interpolation: InterpolationMode,
    border: BorderMode,
) -> Result<(), ImageError> {
    if map_x.shape != map_y.shape {
        return Err(ImageError::InvalidImageSize(
            map_x.shape[0],
            map_x.shape[1],
            map_y.shape[0],
            map_y.shape[1],
        ));
    }

    let map = quadwarp_tensor_ops::ops::band_join(map_x, map_y)
        .map_err(|_| ImageError::InvalidChannelShape(map_x.numel(), map_y.numel()))?;

    remap(src, dst, &Image::from_tensor(map)?, interpolation, border)
}
