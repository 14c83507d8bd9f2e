use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CACHE_DIR, DEFAULT_CANCEL_WAIT_MS, DEFAULT_DECLINE_MARGIN, DEFAULT_DETAIL_HEADROOM,
    DEFAULT_INPUT_DIR, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ORIGINAL_MAX_ZOOM,
    DEFAULT_PROMOTION_THRESHOLD, DEFAULT_WHEEL_STEP,
};
use crate::error::{MonwatchError, Result};

/// Top-level configuration, usually read from a TOML file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MonwatchConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub original: OriginalConfig,
    #[serde(default)]
    pub job: JobConfig,
}

impl MonwatchConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| MonwatchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MonwatchError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.viewport.validate()?;
        if !(self.original.detail_headroom > 0.0) {
            return Err(MonwatchError::Config(format!(
                "original.detail_headroom must be positive, got {}",
                self.original.detail_headroom
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for source TIFFs.
    pub input_dir: PathBuf,
    /// Directory holding the pyramid artifacts.
    pub cache_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

/// Zoom bounds and promotion behaviour of the LOD controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub min_zoom: f64,
    /// Ceiling while a cached level backs the view.
    pub max_zoom: f64,
    /// Crossing this zoom upward asks to switch to the original source.
    pub promotion_threshold: f64,
    /// Ceiling while the original source backs the view.
    pub original_max_zoom: f64,
    /// A declined promotion clamps zoom to `promotion_threshold - decline_margin`.
    pub decline_margin: f64,
    /// Zoom multiplier applied per wheel notch.
    pub wheel_step: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
            original_max_zoom: DEFAULT_ORIGINAL_MAX_ZOOM,
            decline_margin: DEFAULT_DECLINE_MARGIN,
            wheel_step: DEFAULT_WHEEL_STEP,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom > 0.0) {
            return Err(MonwatchError::Config(format!(
                "viewport.min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if self.max_zoom < self.min_zoom || self.original_max_zoom < self.min_zoom {
            return Err(MonwatchError::Config(
                "viewport zoom ceilings must not be below min_zoom".into(),
            ));
        }
        if !(self.promotion_threshold > self.min_zoom) {
            return Err(MonwatchError::Config(format!(
                "viewport.promotion_threshold ({}) must exceed min_zoom ({})",
                self.promotion_threshold, self.min_zoom
            )));
        }
        if self.decline_margin < 0.0 || !(self.wheel_step > 1.0) {
            return Err(MonwatchError::Config(
                "viewport.decline_margin must be >= 0 and wheel_step > 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OriginalConfig {
    /// Target linear resolution of the original load, in multiples of the viewport.
    pub detail_headroom: f64,
}

impl Default for OriginalConfig {
    fn default() -> Self {
        Self {
            detail_headroom: DEFAULT_DETAIL_HEADROOM,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// How long starting a new job waits for the cancelled one to stop.
    pub cancel_wait_ms: u64,
}

impl JobConfig {
    pub fn cancel_wait(&self) -> Duration {
        Duration::from_millis(self.cancel_wait_ms)
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            cancel_wait_ms: DEFAULT_CANCEL_WAIT_MS,
        }
    }
}
