//! Simulated host collaborators and native session
//!
//! Stand-ins for the platform pieces: a native session that only logs what it
//! is asked to do, a permission dialog that answers through the host event
//! queue, and a display whose rotation can be changed at runtime.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use ar_session::prelude::*;

/// Native session that logs calls and counts frames
pub struct SimulatedSession {
    assets_dir: PathBuf,
    frames: Arc<AtomicU64>,
    geometry: Option<DisplayGeometry>,
    pending_dump: Option<PathBuf>,
}

impl SimulatedSession {
    /// Create a session; `frames` is shared so the demo can report progress
    pub fn new(assets_dir: &Path, frames: Arc<AtomicU64>) -> Self {
        log::info!("[native] session allocated (assets: {})", assets_dir.display());
        Self {
            assets_dir: assets_dir.to_path_buf(),
            frames,
            geometry: None,
            pending_dump: None,
        }
    }
}

impl NativeSession for SimulatedSession {
    fn resume(&mut self) -> Result<(), NativeError> {
        log::info!("[native] camera acquired, tracking started");
        Ok(())
    }

    fn pause(&mut self) {
        log::info!("[native] camera released");
    }

    fn destroy(self: Box<Self>) {
        log::info!(
            "[native] session released after {} frames ({})",
            self.frames.load(Ordering::Relaxed),
            self.assets_dir.display()
        );
    }

    fn on_surface_created(&mut self) {
        log::info!("[native] surface created, background texture ready");
    }

    fn on_geometry_changed(&mut self, geometry: DisplayGeometry) {
        log::info!(
            "[native] viewport {}x{} rotation {}",
            geometry.width, geometry.height, geometry.rotation
        );
        self.geometry = Some(geometry);
    }

    fn on_draw_frame(&mut self, features: FeatureFlags) -> Result<(), NativeError> {
        if let Some(destination) = self.pending_dump.take() {
            log::info!("[native] dumping session data to {}", destination.display());
        }
        let frame = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        if frame % 30 == 0 {
            log::debug!("[native] frame {} ({:?})", frame, features);
        }
        Ok(())
    }

    fn is_depth_supported(&self) -> bool {
        true
    }

    fn on_settings_changed(&mut self) {
        log::info!("[native] session reconfigured");
    }

    fn request_dump(&mut self, destination: &Path) {
        self.pending_dump = Some(destination.to_path_buf());
    }
}

/// Permission dialog that grants on request and answers via the event queue
pub struct SimulatedPermissions {
    granted: AtomicBool,
    answers: Mutex<Sender<HostEvent>>,
}

impl SimulatedPermissions {
    /// Create a gate that starts without camera access
    pub fn new(answers: Sender<HostEvent>) -> Self {
        Self {
            granted: AtomicBool::new(false),
            answers: Mutex::new(answers),
        }
    }
}

impl PermissionGate for SimulatedPermissions {
    fn has_camera_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_camera_permission(&self) {
        log::info!("[permission] dialog shown; user taps Allow");
        self.granted.store(true, Ordering::SeqCst);
        let answers = self.answers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if answers.send(HostEvent::PermissionResult(PermissionResult::granted())).is_err() {
            log::warn!("[permission] host event queue closed");
        }
    }

    fn open_permission_settings(&self) {
        log::info!("[permission] opening system settings");
    }
}

/// Display whose rotation the demo flips
#[derive(Default)]
pub struct SimulatedDisplay {
    degrees: AtomicU32,
}

impl SimulatedDisplay {
    /// Rotate the display
    pub fn rotate_to(&self, rotation: DisplayRotation) {
        self.degrees.store(rotation.degrees(), Ordering::SeqCst);
    }
}

impl DisplayInfo for SimulatedDisplay {
    fn current_rotation(&self) -> DisplayRotation {
        DisplayRotation::from_degrees(self.degrees.load(Ordering::SeqCst)).unwrap_or_default()
    }
}
