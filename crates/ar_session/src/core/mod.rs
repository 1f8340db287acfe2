//! # Core Module
//!
//! Shared configuration used by the session coordinator, the render loop and
//! the host glue.

pub mod config;

pub use config::{
    SessionConfig,
    RenderLoopConfig,
    FeatureConfig,
    Config,
    ConfigError,
    ConfigFormat,
};
