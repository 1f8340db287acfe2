//! # AR Session
//!
//! Host-side lifecycle coordination for an augmented-reality session whose
//! tracking and rendering live behind an opaque native handle.
//!
//! ## Features
//!
//! - **Lifecycle State Machine**: create/resume/pause/destroy with permission-gated resume
//! - **Render Loop**: free-running frame ticks that never see a destroyed session
//! - **Geometry Coalescing**: surface size and rotation changes applied once per frame
//! - **Host Glue**: lifecycle and windowing callbacks mapped onto the coordinator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use ar_session::prelude::*;
//!
//! # fn native_session(_: &Path) -> Box<dyn NativeSession> { unimplemented!() }
//! # fn permissions() -> Arc<dyn PermissionGate> { unimplemented!() }
//! # fn display() -> Arc<dyn DisplayInfo> { unimplemented!() }
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::default();
//!     let displays = Arc::new(DisplayEventHub::new());
//!     let mut coordinator = LifecycleCoordinator::new(
//!         SessionCollaborators {
//!             factory: Box::new(native_session),
//!             permissions: permissions(),
//!             displays,
//!             display_info: display(),
//!         },
//!         &config,
//!     );
//!
//!     let render_loop = RenderLoop::spawn(coordinator.render_driver(), &config.render)?;
//!     coordinator.create()?;
//!     coordinator.resume()?;
//!     // ... host runs ...
//!     coordinator.pause()?;
//!     coordinator.destroy()?;
//!     render_loop.stop();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod core;
pub mod config;
pub mod foundation;
pub mod session;
pub mod host;

/// Common imports for session hosts
pub mod prelude {
    pub use crate::{
        core::config::{SessionConfig, RenderLoopConfig, FeatureConfig, Config, ConfigError, ConfigFormat},
        session::{
            DisplayEvent, DisplayEventHub, DisplayEventSource, DisplayGeometry, DisplayInfo,
            DisplayRotation, FeatureFlags, FrameError, FrameOutcome, FrameStats,
            LifecycleCoordinator, LifecycleError, LifecycleState, NativeError, NativeSession,
            PermissionGate, PermissionResult, RenderLoop, RenderLoopDriver, SessionCollaborators,
            SessionFactory, SkipReason,
        },
        host::{HostControl, HostError, HostEvent, Notice, NoticeSink, SessionHost},
    };
}
