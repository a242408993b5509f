#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `quadwarp-tensor` provides [`Tensor`], an owned row-major array with a
//! compile-time number of dimensions. Two-dimensional tensors ([`Tensor2`])
//! are the scalar coordinate fields that flow through the perspective
//! pipeline; three-dimensional tensors back the image container.
//!
//! ```rust
//! use quadwarp_tensor::Tensor2;
//!
//! let field = Tensor2::from_shape_fn([2, 3], |[_, c]| c as f32);
//! assert_eq!(field.as_slice(), &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
//! ```

/// Tensor module containing the main tensor implementation and error types.
pub mod tensor;

pub use crate::tensor::{Tensor, TensorError};

/// Type alias for a 2-dimensional tensor.
pub type Tensor2<T> = Tensor<T, 2>;

/// Type alias for a 3-dimensional tensor.
pub type Tensor3<T> = Tensor<T, 3>;
