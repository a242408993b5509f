use num_traits::Float;
use quadwarp_tensor::{Tensor, Tensor2, Tensor3};
use rayon::prelude::*;

use crate::error::TensorOpsError;

fn check_same_shape<T, const N: usize>(
    a: &Tensor<T, N>,
    b: &Tensor<T, N>,
) -> Result<(), TensorOpsError> {
    if a.shape != b.shape {
        return Err(TensorOpsError::ShapeMismatch(
            a.shape.to_vec(),
            b.shape.to_vec(),
        ));
    }
    Ok(())
}

/// Scale and offset every element of the tensor: `value * a + b`.
///
/// # Arguments
///
/// * `tensor` - The input field.
/// * `a` - The scale factor.
/// * `b` - The offset.
///
/// # Returns
///
/// A new tensor with the same shape as the input.
///
/// # Example
///
/// ```
/// use quadwarp_tensor::Tensor2;
/// use quadwarp_tensor_ops::ops::linear;
///
/// let t = Tensor2::from_shape_vec([1, 3], vec![0.0f32, 1.0, 2.0]).unwrap();
/// let r = linear(&t, 2.0, 1.0);
/// assert_eq!(r.as_slice(), &[1.0, 3.0, 5.0]);
/// ```
pub fn linear<T, const N: usize>(tensor: &Tensor<T, N>, a: T, b: T) -> Tensor<T, N>
where
    T: Float + Send + Sync,
{
    let storage = tensor.as_slice().par_iter().map(|&x| x * a + b).collect();
    Tensor {
        storage,
        shape: tensor.shape,
        strides: tensor.strides,
    }
}

/// Add two same-shaped tensors elementwise.
///
/// The left operand is consumed and its buffer reused for the result.
///
/// # Errors
///
/// If the shapes of the tensors don't match, an error is returned.
///
/// # Example
///
/// ```
/// use quadwarp_tensor::Tensor2;
/// use quadwarp_tensor_ops::ops::add;
///
/// let a = Tensor2::from_shape_vec([1, 2], vec![1.0f32, 2.0]).unwrap();
/// let b = Tensor2::from_shape_vec([1, 2], vec![10.0f32, 20.0]).unwrap();
/// let c = add(a, &b).unwrap();
/// assert_eq!(c.as_slice(), &[11.0, 22.0]);
/// ```
pub fn add<T, const N: usize>(
    lhs: Tensor<T, N>,
    rhs: &Tensor<T, N>,
) -> Result<Tensor<T, N>, TensorOpsError>
where
    T: Float + Send + Sync,
{
    zip_in_place(lhs, rhs, |a, b| a + b)
}

/// Divide two same-shaped tensors elementwise.
///
/// Division follows IEEE-754: a zero denominator yields `±inf` or `NaN` at
/// that element only. The numerator is consumed and its buffer reused.
///
/// # Errors
///
/// If the shapes of the tensors don't match, an error is returned.
pub fn div<T, const N: usize>(
    numer: Tensor<T, N>,
    denom: &Tensor<T, N>,
) -> Result<Tensor<T, N>, TensorOpsError>
where
    T: Float + Send + Sync,
{
    zip_in_place(numer, denom, |a, b| a / b)
}

fn zip_in_place<T, const N: usize>(
    mut lhs: Tensor<T, N>,
    rhs: &Tensor<T, N>,
    op: impl Fn(T, T) -> T + Send + Sync,
) -> Result<Tensor<T, N>, TensorOpsError>
where
    T: Float + Send + Sync,
{
    check_same_shape(&lhs, rhs)?;
    lhs.as_slice_mut()
        .par_iter_mut()
        .zip(rhs.as_slice().par_iter())
        .for_each(|(a, &b)| *a = op(*a, b));
    Ok(lhs)
}

/// Extract a single band from a banded tensor of shape `(rows, cols, bands)`.
///
/// # Errors
///
/// If `band` is not smaller than the number of bands, an error is returned.
///
/// # Example
///
/// ```
/// use quadwarp_tensor::Tensor3;
/// use quadwarp_tensor_ops::ops::extract_band;
///
/// let t = Tensor3::from_shape_vec([1, 2, 2], vec![0u8, 1, 2, 3]).unwrap();
/// let b = extract_band(&t, 1).unwrap();
/// assert_eq!(b.as_slice(), &[1, 3]);
/// ```
pub fn extract_band<T>(tensor: &Tensor3<T>, band: usize) -> Result<Tensor2<T>, TensorOpsError>
where
    T: Copy + Send + Sync,
{
    let [rows, cols, bands] = tensor.shape;
    if band >= bands {
        return Err(TensorOpsError::BandOutOfBounds(band, bands));
    }
    let data = tensor
        .as_slice()
        .par_chunks_exact(bands)
        .map(|pixel| pixel[band])
        .collect();
    Ok(Tensor2::from_shape_vec([rows, cols], data)?)
}

/// Interleave two same-shaped fields into a two-band tensor of shape `(rows, cols, 2)`.
///
/// Element `(r, c, 0)` comes from `first` and `(r, c, 1)` from `second`.
///
/// # Errors
///
/// If the shapes of the fields don't match, an error is returned.
pub fn band_join<T>(first: &Tensor2<T>, second: &Tensor2<T>) -> Result<Tensor3<T>, TensorOpsError>
where
    T: Copy + Default + Send + Sync,
{
    check_same_shape(first, second)?;
    let [rows, cols] = first.shape;

    let mut data = vec![T::default(); rows * cols * 2];
    data.par_chunks_exact_mut(2)
        .zip(first.as_slice().par_iter().zip(second.as_slice().par_iter()))
        .for_each(|(dst, (&a, &b))| {
            dst[0] = a;
            dst[1] = b;
        });

    Ok(Tensor3::from_shape_vec([rows, cols, 2], data)?)
}

/// Count the elements that are `NaN` or infinite.
pub fn count_non_finite<T, const N: usize>(tensor: &Tensor<T, N>) -> usize
where
    T: Float + Send + Sync,
{
    tensor
        .as_slice()
        .par_iter()
        .filter(|x| !x.is_finite())
        .count()
}
