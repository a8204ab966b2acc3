//! Engine configuration
//!
//! Configuration is stored as YAML in the user's config directory.
//! Default location: ~/.config/timegraph/config.yaml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default scale in pixels per millisecond (~50px per 1000s)
pub const DEFAULT_SCALE: f64 = 0.00005;

/// Minimum space between axis ticks in pixels
pub const DEFAULT_MIN_TICK_SPACING_PX: f64 = 100.0;

/// Multiplicative zoom factor per zoom step
pub const DEFAULT_ZOOM_STEP_FACTOR: f64 = 1.2;

/// Timeline engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeGraphConfig {
    /// Initial scale in pixels per millisecond
    pub default_scale: f64,
    /// Lower clamp for scale (always strictly positive)
    pub min_scale: f64,
    /// Upper clamp for scale
    pub max_scale: f64,
    /// Multiplicative factor applied per zoom step
    pub zoom_step_factor: f64,
    /// Minimum space between axis ticks in pixels
    pub min_tick_spacing_px: f64,
    /// chrono format string for tick labels
    pub tick_label_format: String,
}

impl Default for TimeGraphConfig {
    fn default() -> Self {
        Self {
            default_scale: DEFAULT_SCALE,
            min_scale: 1e-10,
            max_scale: 1e4,
            zoom_step_factor: DEFAULT_ZOOM_STEP_FACTOR,
            min_tick_spacing_px: DEFAULT_MIN_TICK_SPACING_PX,
            tick_label_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl TimeGraphConfig {
    /// Return a copy with out-of-range values replaced by defaults
    ///
    /// The engine runs this once at construction so viewport math never sees
    /// a non-positive scale or a zoom factor that cannot grow.
    pub fn validated(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();
        if !(config.min_scale > 0.0) || !config.min_scale.is_finite() {
            config.min_scale = defaults.min_scale;
        }
        if !(config.max_scale > config.min_scale) || !config.max_scale.is_finite() {
            config.max_scale = defaults.max_scale.max(config.min_scale * 10.0);
        }
        if !config.default_scale.is_finite() {
            config.default_scale = defaults.default_scale;
        }
        config.default_scale = config.default_scale.clamp(config.min_scale, config.max_scale);
        if !(config.zoom_step_factor > 1.0) || !config.zoom_step_factor.is_finite() {
            config.zoom_step_factor = defaults.zoom_step_factor;
        }
        if !(config.min_tick_spacing_px > 0.0) || !config.min_tick_spacing_px.is_finite() {
            config.min_tick_spacing_px = defaults.min_tick_spacing_px;
        }
        if config.tick_label_format.is_empty() {
            config.tick_label_format = defaults.tick_label_format;
        }
        config
    }
}

/// Get the default config file path
///
/// Returns: ~/.config/timegraph/config.yaml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("timegraph")
        .join("config.yaml")
}

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config(path: &Path) -> TimeGraphConfig {
    if !path.exists() {
        log::info!("load_config: {:?} doesn't exist, using defaults", path);
        return TimeGraphConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<TimeGraphConfig>(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("load_config: failed to parse config: {}, using defaults", e);
                TimeGraphConfig::default()
            }
        },
        Err(e) => {
            log::warn!("load_config: failed to read config file: {}, using defaults", e);
            TimeGraphConfig::default()
        }
    }
}

/// Save configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &TimeGraphConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
