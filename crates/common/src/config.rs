//! Application configuration.
//!
//! Constructed once at startup and handed to the components that need it.
//! Nothing in the core reads configuration from global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ShotcraftError, ShotcraftResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Initial style applied to every new capture.
    pub style: StyleDefaults,

    /// Selection and cropping parameters.
    pub capture: CaptureDefaults,

    /// Re-render scheduling parameters.
    pub render: RenderDefaults,

    /// Export parameters.
    pub output: OutputDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default style parameters for a new preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleDefaults {
    /// Padding around the subject, in pixels.
    pub padding: f64,

    /// Corner radius of the subject, in pixels.
    pub corner_radius: f64,

    /// Catalog identifier of the selected background.
    pub background_id: String,

    pub shadow_enabled: bool,
    pub shadow_opacity: f64,
    pub shadow_blur_radius: f64,
    pub shadow_offset_y: f64,
}

/// Selection and crop tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Fraction of the display chrome (menu bar) height the crop is shifted
    /// down by when the frame still contains the chrome.
    pub chrome_correction: f64,

    /// Minimum selection width/height; anything smaller is a no-op.
    pub min_selection_px: f64,
}

/// Re-render scheduler tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Trailing debounce delay between the last edit and composition.
    pub debounce_ms: u64,
}

/// Export defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDefaults {
    /// File name proposed when saving without an explicit path.
    pub default_file_name: String,

    /// Directory scanned for image backgrounds.
    pub backgrounds_dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "shotcraft=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            padding: 50.0,
            corner_radius: 16.0,
            background_id: "gradient-sunset".to_string(),
            shadow_enabled: true,
            shadow_opacity: 0.25,
            shadow_blur_radius: 18.0,
            shadow_offset_y: 0.0,
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            chrome_correction: 0.4,
            min_selection_px: 2.0,
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self { debounce_ms: 30 }
    }
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            default_file_name: "shotcraft.png".to_string(),
            backgrounds_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl RenderDefaults {
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> ShotcraftResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ShotcraftResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> ShotcraftResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values no component could work with.
    pub fn validate(&self) -> ShotcraftResult<()> {
        if !self.capture.chrome_correction.is_finite() {
            return Err(ShotcraftError::config("capture.chrome_correction must be finite"));
        }
        if !self.capture.min_selection_px.is_finite() || self.capture.min_selection_px < 0.0 {
            return Err(ShotcraftError::config(
                "capture.min_selection_px must be a non-negative number",
            ));
        }
        if self.style.background_id.trim().is_empty() {
            return Err(ShotcraftError::config("style.background_id must not be empty"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("shotcraft").join("config.json")
}
