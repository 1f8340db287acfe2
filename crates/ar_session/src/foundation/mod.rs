//! Foundation module - Core utilities shared by the session and host layers
//!
//! - Time management for frame pacing and statistics
//! - Logging setup

pub mod time;
pub mod logging;
