//! Configuration for the warp pipeline and the CPU engine.
//!
//! Every struct implements [`Default`] and can be loaded from JSON. Missing
//! fields fall back to their defaults.
//!
//! ```
//! use quadwarp_imgproc::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "strategy": { "Fixed": 2 } }"#).unwrap();
//! assert_eq!(config.warp, Default::default());
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::interpolation::{BorderMode, InterpolationMode};
use crate::parallel::ExecutionStrategy;

/// Numerical tolerances of the homography solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Pivots smaller than `singular_tolerance * max|M|` make the solve fail.
    pub singular_tolerance: f64,
    /// Pivots smaller than `warn_tolerance * max|M|` are accepted but logged.
    pub warn_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            singular_tolerance: 1e-10,
            warn_tolerance: 1e-6,
        }
    }
}

/// Sampling policy of a perspective distortion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    /// Interpolation used to sample the source at fractional coordinates.
    pub interpolation: InterpolationMode,
    /// What to write where the source has no sample.
    pub border: BorderMode,
    /// Solver tolerances.
    pub solver: SolverConfig,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            interpolation: InterpolationMode::Bilinear,
            border: BorderMode::Constant(0.0),
            solver: SolverConfig::default(),
        }
    }
}

/// Startup options of [`crate::engine::CpuEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How field operations and remapping are scheduled.
    pub strategy: ExecutionStrategy,
    /// Install an `env_logger` with this level at startup, `None` leaves logging alone.
    pub log_level: Option<log::LevelFilter>,
    /// Defaults for distortions run through the engine.
    pub warp: WarpConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::default(),
            log_level: None,
            warp: WarpConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(s)?)
    }
}
