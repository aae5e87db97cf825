//! Shared types and configuration for the skywalk viewer.
//!
//! # Invariants
//! - A validated [`Config`] only carries finite, non-negative movement constants.
//! - Every config section falls back to its defaults when omitted.

pub mod config;
pub mod types;

pub use config::{CameraConfig, Config, ConfigError, MovementConfig, WindowConfig};
pub use types::Viewport;
