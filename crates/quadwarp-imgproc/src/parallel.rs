use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quadwarp_image::Image;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how parallel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool.
    #[default]
    Global,

    /// Run on a dedicated single-threaded pool.
    ///
    /// Useful for small images, debugging, or when the overhead of
    /// parallelization outweighs the benefits.
    Serial,

    /// Run on a dedicated thread pool with `n` threads.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Build the dedicated thread pool this strategy asks for, if any.
    ///
    /// # Errors
    ///
    /// Fails for `Fixed(0)` or when Rayon cannot spawn the pool.
    pub fn build_pool(self) -> Result<Option<rayon::ThreadPool>, ParallelError> {
        let num_threads = match self {
            ExecutionStrategy::Global => return Ok(None),
            ExecutionStrategy::Serial => 1,
            ExecutionStrategy::Fixed(0) => return Err(ParallelError::InvalidThreadCount(0)),
            ExecutionStrategy::Fixed(n) => n,
        };

        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("quadwarp-{i}"))
            .build()
            .map(Some)
            .map_err(|e| ParallelError::BuildError(e.to_string()))
    }
}

/// Apply a function to each destination pixel for grid sampling in parallel.
///
/// `map` holds, for every destination pixel, the `(x, y)` source coordinate
/// to sample. Both images must have the same width and height.
pub fn par_iter_rows_resample<const C: usize>(
    dst: &mut Image<f32, C>,
    map: &Image<f32, 2>,
    f: impl Fn(f32, f32, &mut [f32]) + Send + Sync,
) {
    let cols = dst.cols();
    if cols == 0 {
        return;
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .zip(map.as_slice().par_chunks_exact(2 * cols))
        .for_each(|(dst_chunk, map_chunk)| {
            dst_chunk
                .chunks_exact_mut(C)
                .zip(map_chunk.chunks_exact(2))
                .for_each(|(dst_pixel, xy)| {
                    f(xy[0], xy[1], dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadwarp_image::{Image, ImageError};

    #[test]
    fn test_build_pool() -> Result<(), ParallelError> {
        assert!(ExecutionStrategy::Global.build_pool()?.is_none());

        let pool = ExecutionStrategy::Serial.build_pool()?;
        assert_eq!(pool.map(|p| p.current_num_threads()), Some(1));

        let pool = ExecutionStrategy::Fixed(3).build_pool()?;
        assert_eq!(pool.map(|p| p.current_num_threads()), Some(3));

        assert_eq!(
            ExecutionStrategy::Fixed(0).build_pool().err(),
            Some(ParallelError::InvalidThreadCount(0))
        );
        Ok(())
    }

    #[test]
    fn test_par_iter_rows_resample() -> Result<(), ImageError> {
        let mut dst = Image::<f32, 1>::from_size_val([3, 2].into(), 0.0)?;
        let map = Image::<f32, 2>::new(
            [3, 2].into(),
            vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0],
        )?;

        par_iter_rows_resample(&mut dst, &map, |x, y, pixel| {
            pixel[0] = x + 10.0 * y;
        });

        assert_eq!(dst.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        Ok(())
    }
}
