//! Host events, user notices and host-level errors

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

use crate::session::{LifecycleError, PermissionResult};

/// Callbacks delivered by the host, in the order the host observes them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Screen created; allocate the session and start rendering
    Created,

    /// Screen came to the foreground
    Resumed,

    /// Screen went to the background
    Paused,

    /// Screen is being torn down
    Destroyed,

    /// Answer to a camera permission request
    PermissionResult(PermissionResult),

    /// Graphics surface created (may be delivered from the render context)
    SurfaceCreated,

    /// Graphics surface resized (may be delivered from the render context)
    SurfaceResized {
        /// New surface width in pixels
        width: u32,
        /// New surface height in pixels
        height: u32,
    },

    /// User picked a destination for data dumps
    OutputPathSelected(PathBuf),

    /// User asked for a data dump
    DumpRequested,

    /// Session settings changed in the settings menu
    SettingsChanged,

    /// Depth visualization switch flipped
    DepthVisualizationToggled(bool),

    /// Depth occlusion switch flipped
    DepthOcclusionToggled(bool),
}

/// What the host should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostControl {
    /// Keep running
    Continue,
    /// A permission request is in flight; resume is retried on its result
    AwaitingPermission,
    /// Close the AR screen
    Finish,
}

/// User-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Error banner (e.g. the session could not be resumed)
    Error(String),
    /// Informational message
    Message(String),
}

/// Where user-visible notices go
pub trait NoticeSink {
    /// Show a notice to the user
    fn show(&self, notice: Notice);
}

impl NoticeSink for Sender<Notice> {
    fn show(&self, notice: Notice) {
        if self.send(notice).is_err() {
            log::warn!("Notice dropped: receiver is gone");
        }
    }
}

/// Host-level errors
#[derive(Error, Debug)]
pub enum HostError {
    /// Lifecycle transition failed for a reason the host cannot recover from
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// The render thread could not be started
    #[error("Failed to start render thread: {0}")]
    RenderThread(#[from] std::io::Error),
}
