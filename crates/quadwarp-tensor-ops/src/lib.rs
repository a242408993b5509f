#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for tensor operations.
///
/// Defines [`TensorOpsError`] for handling failures during field computations.
pub mod error;

/// Elementwise field operations.
///
/// Scale-and-offset, addition, division, band extraction and band joining
/// over same-shaped tensors. Every operation returns a new owned tensor and
/// runs data-parallel over the elements.
pub mod ops;

pub use error::TensorOpsError;
