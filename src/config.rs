//! Session configuration
//!
//! Serde-backed settings for capture constraints and loop cadence, with
//! JSON persistence for the demo binary and embedding applications.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::{CaptureConstraints, Facing};
use crate::render_loop::DEFAULT_FPS;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    /// File contents were not valid JSON for this schema
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Camera device index to open
    pub camera_index: u32,
    /// Ideal capture width in pixels
    pub ideal_width: u32,
    /// Ideal capture height in pixels
    pub ideal_height: u32,
    /// Preferred camera facing
    pub facing: Facing,
    /// Render loop cadence in frames per second
    pub target_fps: u32,
    /// Draw shoulder debug markers on the composited surface
    pub draw_markers: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            ideal_width: 1280,
            ideal_height: 720,
            facing: Facing::User,
            target_fps: DEFAULT_FPS,
            draw_markers: false,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write configuration to a JSON file, pretty-printed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Capture constraints derived from this config.
    pub fn constraints(&self) -> CaptureConstraints {
        CaptureConstraints {
            ideal_width: self.ideal_width,
            ideal_height: self.ideal_height,
            facing: self.facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ideal_width, 1280);
        assert_eq!(config.ideal_height, 720);
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.facing, Facing::User);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SessionConfig {
            camera_index: 1,
            ideal_width: 640,
            ideal_height: 480,
            facing: Facing::Environment,
            target_fps: 30,
            draw_markers: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let back: SessionConfig = serde_json::from_str(r#"{"target_fps": 24}"#).unwrap();
        assert_eq!(back.target_fps, 24);
        assert_eq!(back.ideal_width, 1280);
        assert!(!back.draw_markers);
    }

    #[test]
    fn test_constraints_projection() {
        let config = SessionConfig {
            ideal_width: 320,
            ideal_height: 240,
            ..Default::default()
        };
        let c = config.constraints();
        assert_eq!(c.ideal_width, 320);
        assert_eq!(c.ideal_height, 240);
    }
}
