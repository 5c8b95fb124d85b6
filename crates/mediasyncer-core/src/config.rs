//! Persisted viewer configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::time::FrameRate;

/// Viewer settings loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Frame rate used for frame stepping and the frame counter.
    pub frame_rate: f64,

    /// Upper zoom bound for both views.
    pub max_zoom: f32,

    /// Fractional zoom change per wheel notch.
    pub zoom_step: f32,

    /// Playback speed presets.
    pub speed_levels: Vec<f64>,

    /// Index into `speed_levels` selected at startup.
    pub default_speed_index: usize,

    /// Whether full-timeline looping starts enabled.
    pub loop_by_default: bool,

    /// Initial master volume.
    pub master_volume: f32,

    /// Decoded frames wider than this are scaled down by ffmpeg.
    pub decode_max_width: u32,

    /// Log filter used when `RUST_LOG` is not set (e.g., "info", "mediasyncer_engine=debug").
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            max_zoom: crate::limits::MAX_ZOOM,
            zoom_step: 0.1,
            speed_levels: vec![0.1, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0],
            default_speed_index: 4,
            loop_by_default: true,
            master_volume: 1.0,
            decode_max_width: 960,
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        match config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from `path`, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Self>(&content) {
                Ok(config) => return config.sanitized(),
                Err(e) => {
                    tracing::warn!("Failed to parse config at {:?}: {}", path, e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, e);
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<()> {
        let path = config_file_path()
            .ok_or_else(|| SyncError::Config("no config directory on this platform".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Replace out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            self.frame_rate = defaults.frame_rate;
        }
        if !self.max_zoom.is_finite() || self.max_zoom < crate::limits::MIN_ZOOM {
            self.max_zoom = defaults.max_zoom;
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 || self.zoom_step >= 1.0 {
            self.zoom_step = defaults.zoom_step;
        }
        self.speed_levels.retain(|s| s.is_finite() && *s > 0.0);
        if self.speed_levels.is_empty() {
            self.speed_levels = defaults.speed_levels;
        }
        if self.default_speed_index >= self.speed_levels.len() {
            self.default_speed_index = self
                .speed_levels
                .iter()
                .position(|s| (*s - 1.0).abs() < f64::EPSILON)
                .unwrap_or(0);
        }
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        if self.decode_max_width == 0 {
            self.decode_max_width = defaults.decode_max_width;
        }
        self
    }

    pub fn frame_rate(&self) -> FrameRate {
        FrameRate::from_fps_f64(self.frame_rate)
    }

    /// Playback rate selected at startup.
    pub fn default_speed(&self) -> f64 {
        self.speed_levels
            .get(self.default_speed_index)
            .copied()
            .unwrap_or(1.0)
    }
}

/// Standard config file location.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mediasyncer").join("config.json"))
}
