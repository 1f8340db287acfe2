//! Native AR session coordination
//!
//! - [`LifecycleCoordinator`]: create/resume/pause/destroy of the native session
//! - [`RenderLoopDriver`] / [`RenderLoop`]: the frame tick and the thread running it
//! - [`GeometryChangeDetector`]: coalesced surface size and rotation changes
//! - [`DisplayEventHub`]: display notifications feeding the detector
//! - [`PermissionGate`], [`NativeSession`]: the host and native collaborators

pub mod display;
pub mod features;
pub mod geometry;
pub mod lifecycle;
pub mod native;
pub mod permission;
pub mod render_loop;

#[cfg(test)]
mod tests;

pub use display::{DisplayEvent, DisplayEventHub, DisplayEventSource, DisplayId, DisplayListener, ListenerId};
pub use features::{FeatureFlags, FeatureToggles};
pub use geometry::{DisplayGeometry, DisplayInfo, DisplayRotation, GeometryChangeDetector};
pub use lifecycle::{LifecycleCoordinator, LifecycleError, LifecycleState, SessionCollaborators};
pub use native::{NativeError, NativeSession, SessionFactory};
pub use permission::{PermissionGate, PermissionResult};
pub use render_loop::{FrameError, FrameOutcome, FrameStats, RenderLoop, RenderLoopDriver, SkipReason};
