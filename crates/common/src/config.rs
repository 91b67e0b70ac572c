//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default extraction-pass parameters.
    pub extraction: ExtractionDefaults,

    /// Default highlight-render parameters.
    pub render: RenderDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionDefaults {
    /// Confidence floor for the low-signal label allow-list (abilities,
    /// smokes, recon drones).
    pub low_confidence_floor: f32,

    /// Confidence floor for every other label (agents, structures).
    pub high_confidence_floor: f32,

    /// Confidence floor for kill-feed detections.
    pub kill_feed_floor: f32,

    /// Confidence floor for the plant-status UI detector.
    pub plant_ui_floor: f32,

    /// Minimum bounding-box side in pixels; smaller detections are noise.
    pub min_box_px: f32,

    /// Kill-feed and plant-UI sampling stride in frames.
    pub sample_stride: u64,
}

/// Default highlight-render parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderDefaults {
    /// Target output duration in seconds.
    pub target_secs: f64,

    /// Exponential smoothing factor for the virtual camera.
    pub camera_smoothing: f64,

    /// Half-size in pixels of the zoomed-in window around an event anchor.
    pub zoom_radius_px: f64,

    /// Optional TTF/OTF font for overlay labels. Labels are skipped when
    /// unset.
    pub font_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "matchlight=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionDefaults::default(),
            render: RenderDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExtractionDefaults {
    fn default() -> Self {
        Self {
            low_confidence_floor: 0.08,
            high_confidence_floor: 0.25,
            kill_feed_floor: 0.20,
            plant_ui_floor: 0.50,
            min_box_px: 5.0,
            sample_stride: 3,
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            target_secs: 30.0,
            camera_smoothing: 0.1,
            zoom_radius_px: 100.0,
            font_path: None,
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

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("matchlight").join("config.json")
}
