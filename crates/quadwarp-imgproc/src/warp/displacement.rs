use quadwarp_image::Image;
use quadwarp_tensor::Tensor2;

use crate::engine::ImageEngine;
use crate::error::WarpError;

/// A two band image holding, for every output pixel, the `(x, y)` location
/// to sample in the input.
pub type DisplacementMap = Image<f32, 2>;

/// Interleave the X and Y fields into a displacement map.
///
/// Pixel `(row, col)` of the map holds `(x[row, col], y[row, col])`.
///
/// # Errors
///
/// Fails with [`WarpError::ShapeMismatch`] when the fields differ in shape.
pub fn assemble_displacement_map<E: ImageEngine>(
    engine: &E,
    x: &Tensor2<f32>,
    y: &Tensor2<f32>,
) -> Result<DisplacementMap, WarpError> {
    if x.shape != y.shape {
        return Err(WarpError::ShapeMismatch(x.shape.to_vec(), y.shape.to_vec()));
    }
    engine.band_join(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CpuEngine;
    use quadwarp_image::ImageSize;

    #[test]
    fn interleaves_fields() -> Result<(), Box<dyn std::error::Error>> {
        let engine = CpuEngine::default();
        let x = Tensor2::from_shape_vec([2, 3], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
        let y = Tensor2::from_shape_vec([2, 3], vec![f32::NAN, -1.0, -2.0, -3.0, -4.0, -5.0])?;
        let map = assemble_displacement_map(&engine, &x, &y)?;

        assert_eq!(
            map.size(),
            ImageSize {
                width: 3,
                height: 2
            }
        );
        assert_eq!(map.get([1, 2, 0]), Some(&5.0));
        assert_eq!(map.get([1, 2, 1]), Some(&-5.0));
        assert!(map.get_unchecked([0, 0, 1]).is_nan());
        Ok(())
    }

    #[test]
    fn rejects_mismatched_fields() {
        let engine = CpuEngine::default();
        let x = Tensor2::<f32>::zeros([4, 4]);
        let y = Tensor2::<f32>::zeros([4, 5]);
        assert_eq!(
            assemble_displacement_map(&engine, &x, &y).err(),
            Some(WarpError::ShapeMismatch(vec![4, 4], vec![4, 5]))
        );
    }
}
