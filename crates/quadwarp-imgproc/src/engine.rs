//! The image engine: field and remap capabilities behind one handle.
//!
//! [`ImageEngine`] is the capability set the perspective pipeline consumes.
//! [`CpuEngine`] is its only implementation; it is created with
//! [`CpuEngine::startup`] and released with [`CpuEngine::shutdown`] (or by
//! dropping it). Nothing is initialised at process level unless the config
//! asks for a logger.

use log::{debug, info};
use thiserror::Error;

use quadwarp_image::{Image, ImageSize};
use quadwarp_tensor::Tensor2;
use quadwarp_tensor_ops::ops;

use crate::config::{EngineConfig, WarpConfig};
use crate::error::WarpError;
use crate::interpolation::{grid, BorderMode, InterpolationMode};
use crate::parallel::ParallelError;
use crate::warp::{self, TiePointSet, TransformVector};

/// Errors raised while starting an engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The configuration could not be parsed.
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The thread pool could not be created.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// A logger is already installed for this process.
    #[error("Failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Capabilities of an image computation engine.
///
/// All fields are `f32` scalar fields of shape (rows, cols); every
/// operation returns a new value and leaves its borrowed inputs untouched.
pub trait ImageEngine {
    /// Two band image holding the x (band 0) and y (band 1) coordinate of every pixel.
    fn coordinate_grid(&self, size: ImageSize) -> Result<Image<f32, 2>, WarpError>;

    /// Extract a single band of a two band image as a scalar field.
    fn extract_band(&self, image: &Image<f32, 2>, band: usize) -> Result<Tensor2<f32>, WarpError>;

    /// `field * a + b`, elementwise.
    fn linear(&self, field: &Tensor2<f32>, a: f32, b: f32) -> Tensor2<f32>;

    /// `lhs + rhs`, elementwise. `lhs` is consumed.
    fn add(&self, lhs: Tensor2<f32>, rhs: &Tensor2<f32>) -> Result<Tensor2<f32>, WarpError>;

    /// `numer / denom`, elementwise with IEEE-754 semantics. `numer` is consumed.
    fn divide(&self, numer: Tensor2<f32>, denom: &Tensor2<f32>)
        -> Result<Tensor2<f32>, WarpError>;

    /// Interleave two fields into a two band image.
    fn band_join(&self, first: &Tensor2<f32>, second: &Tensor2<f32>)
        -> Result<Image<f32, 2>, WarpError>;

    /// Resample `src` into `dst` through a displacement map.
    fn remap<const C: usize>(
        &self,
        src: &Image<f32, C>,
        dst: &mut Image<f32, C>,
        map: &Image<f32, 2>,
        interpolation: InterpolationMode,
        border: BorderMode,
    ) -> Result<(), WarpError>;
}

/// CPU implementation of [`ImageEngine`] backed by Rayon.
pub struct CpuEngine {
    config: EngineConfig,
    pool: Option<rayon::ThreadPool>,
}

impl CpuEngine {
    /// Start an engine.
    ///
    /// Builds the thread pool requested by `config.strategy` and, when
    /// `config.log_level` is set, installs an `env_logger` at that level.
    ///
    /// # Errors
    ///
    /// Fails when the pool cannot be built. An already installed logger is
    /// not an error, the existing one is kept.
    pub fn startup(config: EngineConfig) -> Result<Self, EngineError> {
        if let Some(level) = config.log_level {
            if let Err(e) = init_logger(level) {
                debug!("keeping the existing logger: {e}");
            }
        }

        let pool = config.strategy.build_pool()?;
        info!(
            "engine startup: strategy {:?}, {} threads",
            config.strategy,
            pool.as_ref()
                .map_or_else(rayon::current_num_threads, |p| p.current_num_threads())
        );

        Ok(Self { config, pool })
    }

    /// Stop the engine and release its thread pool.
    pub fn shutdown(self) {
        drop(self);
    }

    /// The configuration the engine was started with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply a perspective distortion described by 16 tie point values.
    ///
    /// `tiepoints` holds 4 x `(target_x, target_y, source_x, source_y)`. The
    /// result has the size of `src`; the engine's [`WarpConfig`] decides the
    /// sampling policy.
    ///
    /// # Errors
    ///
    /// See [`warp::distort_perspective`].
    pub fn distort_perspective<const C: usize>(
        &self,
        src: &Image<f32, C>,
        tiepoints: &[f64],
    ) -> Result<Image<f32, C>, WarpError> {
        let tiepoints = TiePointSet::from_slice(tiepoints)?;
        self.distort_perspective_with(src, &tiepoints, &self.config.warp)
    }

    /// Apply a perspective distortion with an explicit configuration.
    pub fn distort_perspective_with<const C: usize>(
        &self,
        src: &Image<f32, C>,
        tiepoints: &TiePointSet,
        config: &WarpConfig,
    ) -> Result<Image<f32, C>, WarpError> {
        let mut dst = Image::from_size_val(src.size(), config.border.fill_value())?;
        warp::distort_perspective(self, src, &mut dst, tiepoints, config)?;
        Ok(dst)
    }

    /// Displacement map of `coeffs` for an output of the given size.
    pub fn displacement_map(
        &self,
        coeffs: &TransformVector,
        size: ImageSize,
    ) -> Result<Image<f32, 2>, WarpError> {
        warp::displacement_map(self, coeffs, size)
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for CpuEngine {
    /// An engine on the global Rayon pool that leaves logging alone.
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            pool: None,
        }
    }
}

impl Drop for CpuEngine {
    fn drop(&mut self) {
        debug!("engine shutdown: strategy {:?}", self.config.strategy);
    }
}

impl ImageEngine for CpuEngine {
    fn coordinate_grid(&self, size: ImageSize) -> Result<Image<f32, 2>, WarpError> {
        Ok(self.install(|| grid::xyz_image(size))?)
    }

    fn extract_band(&self, image: &Image<f32, 2>, band: usize) -> Result<Tensor2<f32>, WarpError> {
        Ok(self.install(|| ops::extract_band(&image.0, band))?)
    }

    fn linear(&self, field: &Tensor2<f32>, a: f32, b: f32) -> Tensor2<f32> {
        self.install(|| ops::linear(field, a, b))
    }

    fn add(&self, lhs: Tensor2<f32>, rhs: &Tensor2<f32>) -> Result<Tensor2<f32>, WarpError> {
        Ok(self.install(|| ops::add(lhs, rhs))?)
    }

    fn divide(
        &self,
        numer: Tensor2<f32>,
        denom: &Tensor2<f32>,
    ) -> Result<Tensor2<f32>, WarpError> {
        Ok(self.install(|| ops::div(numer, denom))?)
    }

    fn band_join(
        &self,
        first: &Tensor2<f32>,
        second: &Tensor2<f32>,
    ) -> Result<Image<f32, 2>, WarpError> {
        let joined = self.install(|| ops::band_join(first, second))?;
        Ok(Image::from_tensor(joined)?)
    }

    fn remap<const C: usize>(
        &self,
        src: &Image<f32, C>,
        dst: &mut Image<f32, C>,
        map: &Image<f32, 2>,
        interpolation: InterpolationMode,
        border: BorderMode,
    ) -> Result<(), WarpError> {
        Ok(self.install(|| crate::interpolation::remap(src, dst, map, interpolation, border))?)
    }
}

/// Install an `env_logger` filtered at `level`.
///
/// `RUST_LOG` still refines the filter per module.
pub fn init_logger(level: log::LevelFilter) -> Result<(), EngineError> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()?;
    Ok(())
}
