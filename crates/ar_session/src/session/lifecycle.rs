//! Native session lifecycle
//!
//! The coordinator drives one native session through
//! `Uninitialized -> Created -> {Resumed <-> Paused} -> Destroyed`.
//!
//! The session sits in a tagged slot behind a single coarse lock. `destroy()`
//! and the render loop's frame tick both take that lock, so a frame either sees
//! a fully valid session or an absent one, never one that is half torn down.
//! Transitions run on the UI/control thread only; the render thread just
//! borrows the session for the duration of a frame.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use crate::core::SessionConfig;

use super::display::{DisplayEventSource, DisplayListener, ListenerId};
use super::features::FeatureToggles;
use super::geometry::{DisplayInfo, GeometryChangeDetector};
use super::native::{NativeSession, SessionFactory};
use super::permission::PermissionGate;
use super::render_loop::{on_render_thread, RenderLoopDriver};

/// Observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No session allocated yet
    Uninitialized,
    /// Session allocated, never resumed
    Created,
    /// Session running; frames are rendered
    Resumed,
    /// Session paused; frames are skipped
    Paused,
    /// Session destroyed; terminal
    Destroyed,
}

impl LifecycleState {
    /// Whether a native session currently exists
    pub fn has_session(self) -> bool {
        matches!(self, Self::Created | Self::Resumed | Self::Paused)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Created => "created",
            Self::Resumed => "resumed",
            Self::Paused => "paused",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Lifecycle transition errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Transition needs a session but `create()` was never called
    #[error("Native session has not been created")]
    NotCreated,

    /// `create()` called while a session already exists
    #[error("Native session already created")]
    AlreadyCreated,

    /// Transition attempted after `destroy()`
    #[error("Native session has been destroyed")]
    Destroyed,

    /// Resume refused: camera permission is not granted
    #[error("Camera permission is required to resume the session")]
    PermissionRequired,

    /// Native resume failed; the session keeps its previous state
    #[error("Failed to resume AR session: {0}")]
    ResourceAcquisition(String),

    /// Transition invoked from the render thread
    #[error("{0}() must not be called from the render thread")]
    WrongThread(&'static str),
}

/// Phase of an allocated session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActivePhase {
    Created,
    Resumed,
    Paused,
}

pub(crate) struct ActiveSession {
    pub(crate) session: Box<dyn NativeSession>,
    pub(crate) phase: ActivePhase,
}

/// Tagged session slot guarded by the coarse lock
pub(crate) enum SessionSlot {
    Uninitialized,
    Active(ActiveSession),
    Destroyed,
}

impl SessionSlot {
    pub(crate) fn state(&self) -> LifecycleState {
        match self {
            Self::Uninitialized => LifecycleState::Uninitialized,
            Self::Active(active) => match active.phase {
                ActivePhase::Created => LifecycleState::Created,
                ActivePhase::Resumed => LifecycleState::Resumed,
                ActivePhase::Paused => LifecycleState::Paused,
            },
            Self::Destroyed => LifecycleState::Destroyed,
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession, LifecycleError> {
        match self {
            Self::Active(active) => Ok(active),
            Self::Uninitialized => Err(LifecycleError::NotCreated),
            Self::Destroyed => Err(LifecycleError::Destroyed),
        }
    }
}

/// State shared between the coordinator and the render loop
pub(crate) struct SessionShared {
    slot: Mutex<SessionSlot>,
    pub(crate) geometry: Arc<GeometryChangeDetector>,
    pub(crate) features: Arc<FeatureToggles>,
}

impl SessionShared {
    /// Take the coarse session lock
    ///
    /// A frame that panicked while holding the lock poisons it. The slot itself
    /// is still a valid tag, so the poison is cleared instead of wedging every
    /// later frame and the teardown path.
    pub(crate) fn lock_slot(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| {
            log::warn!("Session lock poisoned by a failed frame; recovering");
            self.slot.clear_poison();
            poisoned.into_inner()
        })
    }
}

/// Host collaborators the coordinator needs
pub struct SessionCollaborators {
    /// Allocates the native session
    pub factory: Box<dyn SessionFactory>,
    /// Camera permission oracle
    pub permissions: Arc<dyn PermissionGate>,
    /// Display notification source
    pub displays: Arc<dyn DisplayEventSource>,
    /// Current display rotation query
    pub display_info: Arc<dyn DisplayInfo>,
}

/// Owns the native session and drives its lifecycle
pub struct LifecycleCoordinator {
    shared: Arc<SessionShared>,
    factory: Box<dyn SessionFactory>,
    permissions: Arc<dyn PermissionGate>,
    displays: Arc<dyn DisplayEventSource>,
    display_subscription: Option<ListenerId>,
    assets_dir: PathBuf,
}

impl LifecycleCoordinator {
    /// Create a coordinator; no native session is allocated until [`create`](Self::create)
    pub fn new(collaborators: SessionCollaborators, config: &SessionConfig) -> Self {
        let SessionCollaborators { factory, permissions, displays, display_info } = collaborators;
        let shared = Arc::new(SessionShared {
            slot: Mutex::new(SessionSlot::Uninitialized),
            geometry: Arc::new(GeometryChangeDetector::new(display_info)),
            features: Arc::new(FeatureToggles::new(config.features.flags())),
        });

        Self {
            shared,
            factory,
            permissions,
            displays,
            display_subscription: None,
            assets_dir: PathBuf::from(&config.assets_dir),
        }
    }

    /// Driver for the render thread, sharing this coordinator's session lock
    pub fn render_driver(&self) -> RenderLoopDriver {
        RenderLoopDriver::new(Arc::clone(&self.shared))
    }

    /// Geometry detector fed by surface-resize and display callbacks
    pub fn geometry(&self) -> Arc<GeometryChangeDetector> {
        Arc::clone(&self.shared.geometry)
    }

    /// Feature toggles read by every frame
    pub fn features(&self) -> Arc<FeatureToggles> {
        Arc::clone(&self.shared.features)
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.shared.lock_slot().state()
    }

    /// Whether a display listener is currently registered
    pub fn is_listening_for_display_changes(&self) -> bool {
        self.display_subscription.is_some()
    }

    /// Allocate the native session
    ///
    /// Allowed once. A repeated call is a programming error: it is logged and
    /// refused, and the existing session is left untouched.
    pub fn create(&mut self) -> Result<(), LifecycleError> {
        ensure_control_thread("create")?;
        let mut slot = self.shared.lock_slot();
        match *slot {
            SessionSlot::Uninitialized => {}
            SessionSlot::Active(_) => {
                log::error!("create() called twice; keeping the existing native session");
                return Err(LifecycleError::AlreadyCreated);
            }
            SessionSlot::Destroyed => {
                log::error!("create() called after destroy()");
                return Err(LifecycleError::Destroyed);
            }
        }

        log::info!("Creating native session (assets: {})", self.assets_dir.display());
        let session = self.factory.create(&self.assets_dir);
        *slot = SessionSlot::Active(ActiveSession { session, phase: ActivePhase::Created });
        Ok(())
    }

    /// Resume the session
    ///
    /// Refused with [`LifecycleError::PermissionRequired`] unless the camera
    /// permission is granted right now; the caller should start the permission
    /// request flow and retry once it is granted. A native failure leaves the
    /// state unchanged.
    pub fn resume(&mut self) -> Result<(), LifecycleError> {
        ensure_control_thread("resume")?;
        {
            let mut slot = self.shared.lock_slot();
            let active = slot.active_mut()?;
            if !self.permissions.has_camera_permission() {
                log::info!("Camera permission not granted; resume refused");
                return Err(LifecycleError::PermissionRequired);
            }
            if active.phase == ActivePhase::Resumed {
                return Ok(());
            }

            active.session.resume().map_err(|e| {
                log::error!("Exception resuming session: {}", e);
                LifecycleError::ResourceAcquisition(e.to_string())
            })?;
            active.phase = ActivePhase::Resumed;
        }
        log::info!("Native session resumed");

        self.subscribe_display_events();
        // Rotation may have changed while the listener was detached.
        self.shared.geometry.notify_display_changed();
        Ok(())
    }

    /// Pause the session; no-op unless it is resumed
    pub fn pause(&mut self) -> Result<(), LifecycleError> {
        ensure_control_thread("pause")?;
        self.unsubscribe_display_events();

        let mut slot = self.shared.lock_slot();
        if let SessionSlot::Active(active) = &mut *slot {
            if active.phase == ActivePhase::Resumed {
                active.session.pause();
                active.phase = ActivePhase::Paused;
                log::info!("Native session paused");
            }
        }
        Ok(())
    }

    /// Destroy the session; idempotent
    ///
    /// Pauses first when still resumed. The slot is absent before this returns,
    /// and the native teardown runs under the same lock as the frame tick.
    pub fn destroy(&mut self) -> Result<(), LifecycleError> {
        ensure_control_thread("destroy")?;
        self.unsubscribe_display_events();

        let mut slot = self.shared.lock_slot();
        match std::mem::replace(&mut *slot, SessionSlot::Destroyed) {
            SessionSlot::Active(mut active) => {
                if active.phase == ActivePhase::Resumed {
                    active.session.pause();
                }
                active.session.destroy();
                log::info!("Native session destroyed");
            }
            SessionSlot::Uninitialized => log::debug!("destroy() without a session; nothing to release"),
            SessionSlot::Destroyed => log::debug!("destroy() on an already destroyed session"),
        }
        Ok(())
    }

    /// Whether the device supports depth; false without a session
    pub fn is_depth_supported(&self) -> bool {
        match &*self.shared.lock_slot() {
            SessionSlot::Active(active) => active.session.is_depth_supported(),
            _ => false,
        }
    }

    /// Ask the session to reconfigure after a settings change
    pub fn settings_changed(&self) {
        if let SessionSlot::Active(active) = &mut *self.shared.lock_slot() {
            active.session.on_settings_changed();
        }
    }

    /// Ask the session to dump its data to `destination`
    pub fn request_dump(&self, destination: &Path) -> Result<(), LifecycleError> {
        let mut slot = self.shared.lock_slot();
        let active = slot.active_mut()?;
        active.session.request_dump(destination);
        Ok(())
    }

    fn subscribe_display_events(&mut self) {
        if self.display_subscription.is_none() {
            let listener = DisplayListener::new(Arc::clone(&self.shared.geometry));
            self.display_subscription = Some(self.displays.register_listener(listener));
        }
    }

    fn unsubscribe_display_events(&mut self) {
        if let Some(id) = self.display_subscription.take() {
            self.displays.unregister_listener(id);
        }
    }
}

impl Drop for LifecycleCoordinator {
    fn drop(&mut self) {
        if self.state() != LifecycleState::Destroyed {
            log::warn!("Coordinator dropped without destroy(); tearing down the native session");
            if let Err(e) = self.destroy() {
                log::error!("Teardown on drop failed: {}", e);
            }
        }
    }
}

impl fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("state", &self.state())
            .field("display_subscription", &self.display_subscription)
            .field("assets_dir", &self.assets_dir)
            .finish_non_exhaustive()
    }
}

fn ensure_control_thread(operation: &'static str) -> Result<(), LifecycleError> {
    if on_render_thread() {
        log::error!("{}() called from the render thread; refused", operation);
        return Err(LifecycleError::WrongThread(operation));
    }
    Ok(())
}
