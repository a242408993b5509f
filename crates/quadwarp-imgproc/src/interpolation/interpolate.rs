use super::bilinear::bilinear_interpolation;
use super::nearest::nearest_neighbor_interpolation;
use quadwarp_image::Image;
use serde::{Deserialize, Serialize};

/// Interpolation mode for sampling at fractional coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// Policy for coordinates that have no source sample.
///
/// A coordinate is inside the source when it lies within half a pixel of the
/// pixel grid, i.e. in `[-0.5, cols - 0.5] x [-0.5, rows - 0.5]`. Non-finite
/// coordinates never have a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BorderMode {
    /// Write the given value in every channel outside the source.
    Constant(f32),
    /// Clamp out-of-range coordinates to the nearest edge pixel.
    ///
    /// Non-finite coordinates are written as zero.
    Replicate,
}

impl BorderMode {
    /// Value written where there is no sample.
    pub fn fill_value(&self) -> f32 {
        match self {
            BorderMode::Constant(v) => *v,
            BorderMode::Replicate => 0.0,
        }
    }
}

/// Sample a pixel at fractional coordinates.
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
/// * `border` - What to return where the image has no sample.
///
/// # Returns
///
/// The interpolated pixel values. Any `u`/`v`, including `NaN` and infinities,
/// is accepted.
///
/// # Example
///
/// ```
/// use quadwarp_image::Image;
/// use quadwarp_imgproc::interpolation::{interpolate_pixel, BorderMode, InterpolationMode};
///
/// let image = Image::<f32, 1>::new([2, 1].into(), vec![0.0, 10.0]).unwrap();
/// let mid = interpolate_pixel(&image, 0.5, 0.0, InterpolationMode::Bilinear, BorderMode::Constant(-1.0));
/// assert_eq!(mid, [5.0]);
/// let nan = interpolate_pixel(&image, f32::NAN, 0.0, InterpolationMode::Bilinear, BorderMode::Constant(-1.0));
/// assert_eq!(nan, [-1.0]);
/// ```
pub fn interpolate_pixel<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
    border: BorderMode,
) -> [f32; C] {
    let (rows, cols) = (image.rows(), image.cols());
    if rows == 0 || cols == 0 || !u.is_finite() || !v.is_finite() {
        return [border.fill_value(); C];
    }

    let (max_u, max_v) = ((cols - 1) as f32, (rows - 1) as f32);
    if let BorderMode::Constant(fill) = border {
        let inside = u >= -0.5 && u <= max_u + 0.5 && v >= -0.5 && v <= max_v + 0.5;
        if !inside {
            return [fill; C];
        }
    }

    let (u, v) = (u.clamp(0.0, max_u), v.clamp(0.0, max_v));

    match interpolation {
        InterpolationMode::Bilinear => bilinear_interpolation(image, u, v),
        InterpolationMode::Nearest => nearest_neighbor_interpolation(image, u, v),
    }
}
