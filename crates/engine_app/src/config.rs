//! Loop configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Simulation rate used when neither the configured floor nor the measured
/// refresh rate yields a usable value.
pub const FALLBACK_SIM_RATE: f64 = 60.0;

/// Configuration for the game loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Id of the drawing surface to acquire.
    pub surface_id: String,
    /// Logical pixel width of the surface.
    pub width: u32,
    /// Logical pixel height of the surface.
    pub height: u32,
    /// Lower bound for the simulation rate, in Hz. The measured display
    /// refresh rate is used when it is higher.
    pub fps: Option<f64>,
    /// Number of refreshes, rendered or skipped, after which the loop
    /// returns (0 = never).
    pub max_frames: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            surface_id: "canvas".to_string(),
            width: 640,
            height: 360,
            fps: None,
            max_frames: 0,
        }
    }
}

impl LoopConfig {
    /// Create a config for a surface of the given logical size.
    #[must_use]
    pub fn new(surface_id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            surface_id: surface_id.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Set the simulation rate floor.
    #[must_use]
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Stop after `frames` refreshes.
    #[must_use]
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = frames;
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Pick the simulation rate: the larger of the configured floor and the
    /// measured refresh rate, or [`FALLBACK_SIM_RATE`] if neither is usable.
    #[must_use]
    pub fn simulation_rate(&self, measured: f64) -> f64 {
        let floor = self.fps.filter(|f| f.is_finite()).unwrap_or(0.0);
        let measured = if measured.is_finite() { measured } else { 0.0 };
        let chosen = floor.max(measured);
        if chosen > 0.0 { chosen } else { FALLBACK_SIM_RATE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_wins_when_higher() {
        let config = LoopConfig::default().with_fps(120.0);
        assert_eq!(config.simulation_rate(60.0), 120.0);
    }

    #[test]
    fn test_measured_wins_when_higher() {
        let config = LoopConfig::default().with_fps(30.0);
        assert_eq!(config.simulation_rate(144.0), 144.0);
    }

    #[test]
    fn test_no_usable_rate_falls_back() {
        let config = LoopConfig::default();
        assert_eq!(config.simulation_rate(0.0), FALLBACK_SIM_RATE);
        assert_eq!(config.simulation_rate(f64::INFINITY), FALLBACK_SIM_RATE);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: LoopConfig =
            serde_json::from_str(r#"{"surface_id": "game", "fps": 30}"#).unwrap();
        assert_eq!(config.surface_id, "game");
        assert_eq!(config.fps, Some(30.0));
        assert_eq!(config.width, 640);
        assert_eq!(config.max_frames, 0);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = LoopConfig::from_json_file("/nonexistent/loop.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
