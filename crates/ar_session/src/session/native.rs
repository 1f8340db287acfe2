//! Native session interface
//!
//! The tracking and rendering subsystem lives behind an opaque handle. This
//! module describes only the calls the coordinator makes on it; everything
//! behind them (camera pose, depth, background rendering) belongs to the
//! native side.

use std::path::Path;
use thiserror::Error;

use super::features::FeatureFlags;
use super::geometry::DisplayGeometry;

/// Errors raised by the native session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    /// Camera could not be opened (busy, disconnected, ...)
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Device or runtime does not support AR sessions
    #[error("Device not supported: {0}")]
    UnsupportedDevice(String),

    /// Any other failure reported by the native subsystem
    #[error("Native session error: {0}")]
    Session(String),
}

/// Opaque native session handle
///
/// Every call except [`NativeSession::on_draw_frame`],
/// [`NativeSession::on_geometry_changed`] and
/// [`NativeSession::on_surface_created`] happens on the UI thread. The
/// coordinator serializes all of them behind one lock, so implementations do
/// not need their own synchronization.
pub trait NativeSession: Send {
    /// Acquire the camera and start tracking
    ///
    /// May block briefly. On error the session must stay usable for a retry.
    fn resume(&mut self) -> Result<(), NativeError>;

    /// Release the camera and stop tracking
    fn pause(&mut self);

    /// Release every native resource
    fn destroy(self: Box<Self>);

    /// The graphics surface was created
    fn on_surface_created(&mut self);

    /// Viewport size or display rotation changed
    fn on_geometry_changed(&mut self, geometry: DisplayGeometry);

    /// Update tracking and render one frame
    fn on_draw_frame(&mut self, features: FeatureFlags) -> Result<(), NativeError>;

    /// Whether the device supports depth
    fn is_depth_supported(&self) -> bool {
        false
    }

    /// Settings changed; reconfigure the session
    fn on_settings_changed(&mut self) {}

    /// Write a dump of session data to `destination`, typically on the next frame
    fn request_dump(&mut self, _destination: &Path) {}
}

/// Allocates native sessions
pub trait SessionFactory: Send + Sync {
    /// Create a session that loads its assets from `assets_dir`
    fn create(&self, assets_dir: &Path) -> Box<dyn NativeSession>;
}

impl<F> SessionFactory for F
where
    F: Fn(&Path) -> Box<dyn NativeSession> + Send + Sync,
{
    fn create(&self, assets_dir: &Path) -> Box<dyn NativeSession> {
        self(assets_dir)
    }
}
