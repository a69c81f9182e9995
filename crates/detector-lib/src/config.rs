//! Detector configuration

use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;
use thiserror::Error;

/// Configuration errors reported at engine construction.
///
/// These are the only hard failures the engine surfaces: all runtime
/// conditions (insufficient data, degenerate variance, persistence I/O)
/// are handled as non-detections or logged recoveries.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window_size must be positive, got {0}")]
    InvalidWindowSize(usize),

    #[error("threshold must be a positive finite number, got {0}")]
    InvalidThreshold(f64),

    #[error("min_data_points must be positive, got {0}")]
    InvalidMinDataPoints(usize),

    #[error("ewma_alpha must be in (0, 1], got {0}")]
    InvalidEwmaAlpha(f64),
}

/// Detector engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// Rolling window capacity per metric
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Z-score magnitude at which a value is flagged
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Samples required in a window before detection starts
    #[serde(default = "default_min_data_points")]
    pub min_data_points: usize,

    /// Smoothing factor for EWMA baseline updates
    #[serde(default = "default_ewma_alpha")]
    pub ewma_alpha: f64,

    /// Snapshot file for baseline persistence (no persistence when unset)
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

fn default_window_size() -> usize {
    100
}

fn default_threshold() -> f64 {
    3.0
}

fn default_min_data_points() -> usize {
    30
}

fn default_ewma_alpha() -> f64 {
    0.1
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            threshold: default_threshold(),
            min_data_points: default_min_data_points(),
            ewma_alpha: default_ewma_alpha(),
            snapshot_path: None,
        }
    }
}

impl DetectorConfig {
    /// Load configuration from `SENTINEL_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SENTINEL"))
            .build()?;

        let config: DetectorConfig = config.try_deserialize().unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration bounds.
    ///
    /// The engine refuses to construct with an invalid configuration;
    /// everything after construction is guaranteed well-formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize(self.window_size));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.min_data_points == 0 {
            return Err(ConfigError::InvalidMinDataPoints(self.min_data_points));
        }
        if !self.ewma_alpha.is_finite() || self.ewma_alpha <= 0.0 || self.ewma_alpha > 1.0 {
            return Err(ConfigError::InvalidEwmaAlpha(self.ewma_alpha));
        }
        Ok(())
    }
}
