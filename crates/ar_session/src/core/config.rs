//! # Session Configuration
//!
//! Configuration for the AR session host: logging, where the native side loads
//! its assets from, render loop cadence and the initial feature toggles.
//!
//! Every section has defaults, so a config file only needs the keys it changes.

use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::session::FeatureFlags;

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Highest render cadence accepted; above this the loop just spins.
const MAX_TARGET_FPS: u32 = 240;

/// # Render Loop Configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderLoopConfig {
    /// Frame ticks per second (display refresh cadence)
    pub target_fps: u32,
    /// Log frame statistics every N ticks (0 disables the report)
    pub report_interval_frames: u64,
}

impl RenderLoopConfig {
    /// Create a render loop configuration with the default 60 Hz cadence
    pub fn new() -> Self {
        Self {
            target_fps: 60,
            report_interval_frames: 600,
        }
    }

    /// Set the tick rate
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Set how often frame statistics are logged
    pub fn with_report_interval(mut self, frames: u64) -> Self {
        self.report_interval_frames = frames;
        self
    }
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Feature Configuration
///
/// Initial values of the toggles passed to every frame render.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureConfig {
    /// Colorize the depth image over the camera background
    pub depth_visualization: bool,
    /// Use depth for virtual content occlusion
    pub depth_occlusion: bool,
}

impl FeatureConfig {
    /// Convert into the flag set used by the render loop
    pub fn flags(self) -> FeatureFlags {
        let mut flags = FeatureFlags::empty();
        flags.set(FeatureFlags::DEPTH_VISUALIZATION, self.depth_visualization);
        flags.set(FeatureFlags::DEPTH_OCCLUSION, self.depth_occlusion);
        flags
    }
}

/// # Complete Session Configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Directory the native session loads its assets from
    pub assets_dir: String,
    /// Render loop settings
    pub render: RenderLoopConfig,
    /// Initial feature toggles
    pub features: FeatureConfig,
}

impl SessionConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            assets_dir: "assets".to_string(),
            render: RenderLoopConfig::default(),
            features: FeatureConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set assets directory
    pub fn with_assets_dir(mut self, dir: impl Into<String>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Set render loop configuration
    pub fn with_render(mut self, render: RenderLoopConfig) -> Self {
        self.render = render;
        self
    }

    /// Set initial feature toggles
    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets_dir.is_empty() {
            return Err(ConfigError::Invalid("assets_dir cannot be empty".to_string()));
        }

        if self.render.target_fps == 0 || self.render.target_fps > MAX_TARGET_FPS {
            return Err(ConfigError::Invalid(format!(
                "target_fps must be between 1 and {}, got {}",
                MAX_TARGET_FPS, self.render.target_fps
            )));
        }

        Ok(())
    }

    /// Load from file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for SessionConfig {}
