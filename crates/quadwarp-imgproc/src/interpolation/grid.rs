use quadwarp_image::{Image, ImageError, ImageSize};
use quadwarp_tensor::{Tensor2, TensorError};

/// Create a meshgrid of x and y coordinates
///
/// # Arguments
///
/// * `rows` - The number of rows indicating the height of the grid
/// * `cols` - The number of columns indicating the width of the grid
///
/// # Returns
///
/// A tuple of 2D arrays of shape (rows, cols) where `x[row][col] = col` and
/// `y[row][col] = row`.
///
/// # Errors
///
/// Both dimensions must be greater than zero.
///
/// # Example
///
/// ```
/// use quadwarp_imgproc::interpolation::grid::meshgrid;
///
/// let (x, y) = meshgrid(2, 3).unwrap();
/// assert_eq!(x.as_slice(), &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
/// assert_eq!(y.as_slice(), &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
/// ```
pub fn meshgrid(rows: usize, cols: usize) -> Result<(Tensor2<f32>, Tensor2<f32>), TensorError> {
    check_non_empty(rows, cols)?;
    let map_x = Tensor2::from_shape_fn([rows, cols], |[_, c]| c as f32);
    let map_y = Tensor2::from_shape_fn([rows, cols], |[r, _]| r as f32);
    Ok((map_x, map_y))
}

/// Create a two band coordinate image: band 0 holds the x coordinate and
/// band 1 the y coordinate of every pixel.
///
/// # Errors
///
/// The size must be non-empty.
pub fn xyz_image(size: ImageSize) -> Result<Image<f32, 2>, ImageError> {
    if size.width == 0 || size.height == 0 {
        return Err(ImageError::EmptyImage(size.width, size.height));
    }

    let data = (0..size.height)
        .flat_map(|r| (0..size.width).flat_map(move |c| [c as f32, r as f32]))
        .collect();

    Image::new(size, data)
}

fn check_non_empty(rows: usize, cols: usize) -> Result<(), TensorError> {
    for (dim, &len) in [rows, cols].iter().enumerate() {
        if len == 0 {
            return Err(TensorError::EmptyDimension {
                dim,
                shape: vec![rows, cols],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadwarp_tensor_ops::ops::extract_band;

    #[test]
    fn meshgrid_shape_and_values() -> Result<(), TensorError> {
        let (x, y) = meshgrid(3, 2)?;
        assert_eq!(x.shape, [3, 2]);
        assert_eq!(y.shape, [3, 2]);
        assert_eq!(x.as_slice(), &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        assert_eq!(y.as_slice(), &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        Ok(())
    }

    #[test]
    fn meshgrid_empty() {
        assert_eq!(
            meshgrid(0, 4).err(),
            Some(TensorError::EmptyDimension {
                dim: 0,
                shape: vec![0, 4]
            })
        );
        assert!(meshgrid(4, 0).is_err());
    }

    #[test]
    fn xyz_matches_meshgrid() -> Result<(), Box<dyn std::error::Error>> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let xyz = xyz_image(size)?;
        assert_eq!(xyz.size(), size);
        assert_eq!(xyz.get([2, 1, 0]), Some(&1.0));
        assert_eq!(xyz.get([2, 1, 1]), Some(&2.0));

        let (x, y) = meshgrid(size.height, size.width)?;
        assert_eq!(extract_band(&xyz.0, 0)?, x);
        assert_eq!(extract_band(&xyz.0, 1)?, y);

        assert!(xyz_image([0, 3].into()).is_err());
        Ok(())
    }
}
