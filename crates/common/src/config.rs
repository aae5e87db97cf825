//! Viewer configuration loaded from YAML.
//!
//! Every section is optional; missing fields take their defaults. Example:
//! ```yaml
//! window:
//!   title: skywalk
//!   width: 1280
//!   height: 720
//! camera:
//!   fov_degrees: 75.0
//!   sensitivity: 0.002
//! movement:
//!   base_speed: 50.0
//!   jump_speed: 12.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Movement integration constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Proportional lateral damping per second.
    pub damping: f32,
    /// Downward acceleration in units per second squared.
    pub gravity: f32,
    /// Lateral acceleration applied while a movement key is held.
    pub base_speed: f32,
    /// Factor applied to `base_speed` while sprinting.
    pub sprint_multiplier: f32,
    /// Vertical velocity set by a jump.
    pub jump_speed: f32,
    /// Height the pose is clamped to.
    pub ground_height: f32,
    /// Longest frame, in seconds, the desktop host integrates in one variable step.
    pub max_step: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            damping: 10.0,
            gravity: 30.0,
            base_speed: 50.0,
            sprint_multiplier: 2.0,
            jump_speed: 12.0,
            ground_height: 2.0,
            max_step: 0.1,
        }
    }
}

/// Camera projection and mouse-look settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Radians of rotation per pixel of mouse motion.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            sensitivity: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "skywalk".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub movement: MovementConfig,
}

impl Config {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&data)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize back to YAML (used by `skywalk-cli config`).
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        non_negative("movement.damping", m.damping)?;
        non_negative("movement.gravity", m.gravity)?;
        non_negative("movement.base_speed", m.base_speed)?;
        non_negative("movement.jump_speed", m.jump_speed)?;
        finite("movement.ground_height", m.ground_height)?;
        finite("movement.sprint_multiplier", m.sprint_multiplier)?;
        if m.sprint_multiplier < 1.0 {
            return Err(invalid("movement.sprint_multiplier", "must be at least 1.0"));
        }
        finite("movement.max_step", m.max_step)?;
        if m.max_step <= 0.0 {
            return Err(invalid("movement.max_step", "must be positive"));
        }

        let c = &self.camera;
        finite("camera.fov_degrees", c.fov_degrees)?;
        if !(1.0..180.0).contains(&c.fov_degrees) {
            return Err(invalid("camera.fov_degrees", "must be in [1, 180)"));
        }
        non_negative("camera.sensitivity", c.sensitivity)?;
        finite("camera.near", c.near)?;
        finite("camera.far", c.far)?;
        if c.near <= 0.0 || c.far <= c.near {
            return Err(invalid("camera.near", "require 0 < near < far"));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "width and height must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not finite")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.movement.damping, 10.0);
        assert_eq!(config.movement.gravity, 30.0);
        assert_eq!(config.movement.base_speed, 50.0);
        assert_eq!(config.movement.sprint_multiplier, 2.0);
        assert_eq!(config.movement.jump_speed, 12.0);
        assert_eq!(config.movement.ground_height, 2.0);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml_str("movement:\n  jump_speed: 20.0\n").unwrap();
        assert_eq!(config.movement.jump_speed, 20.0);
        assert_eq!(config.movement.gravity, 30.0);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn empty_document_is_default() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn negative_gravity_rejected() {
        let err = Config::from_yaml_str("movement:\n  gravity: -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "movement.gravity",
                ..
            }
        ));
    }

    #[test]
    fn sprint_below_one_rejected() {
        let err = Config::from_yaml_str("movement:\n  sprint_multiplier: 0.5\n").unwrap_err();
        assert!(err.to_string().contains("sprint_multiplier"));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let err = Config::from_yaml_str("movement: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "window:\n  title: test\n  width: 640\n  height: 480").unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.window.title, "test");
        assert_eq!(config.window.width, 640);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Config::load(tmp.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn yaml_roundtrip_preserves_values() {
        let mut config = Config::default();
        config.movement.base_speed = 75.0;
        let yaml = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml_str(&yaml).unwrap(), config);
    }
}
