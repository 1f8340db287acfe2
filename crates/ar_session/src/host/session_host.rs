//! Session host: host callbacks in, coordinator transitions out

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::SessionConfig;
use crate::session::{
    FeatureFlags, FrameStats, LifecycleCoordinator, LifecycleError, LifecycleState,
    PermissionGate, PermissionResult, RenderLoop, RenderLoopDriver,
};

use super::events::{HostControl, HostError, HostEvent, Notice, NoticeSink};

const PERMISSION_NEEDED: &str = "Camera permission is needed to run this application";

/// Drives one AR screen from host callbacks
///
/// Runs on the UI thread. The render thread is started on
/// [`HostEvent::Created`] and stopped after the session is destroyed.
pub struct SessionHost {
    coordinator: LifecycleCoordinator,
    driver: RenderLoopDriver,
    permissions: Arc<dyn PermissionGate>,
    notices: Box<dyn NoticeSink>,
    config: SessionConfig,
    render_loop: Option<RenderLoop>,
    output_path: Option<PathBuf>,
    foreground: bool,
    last_frame_stats: Option<FrameStats>,
}

impl SessionHost {
    /// Create a host around a coordinator
    ///
    /// `permissions` must be the same gate the coordinator checks.
    pub fn new(
        coordinator: LifecycleCoordinator,
        permissions: Arc<dyn PermissionGate>,
        notices: Box<dyn NoticeSink>,
        config: SessionConfig,
    ) -> Self {
        let driver = coordinator.render_driver();
        Self {
            coordinator,
            driver,
            permissions,
            notices,
            config,
            render_loop: None,
            output_path: None,
            foreground: false,
            last_frame_stats: None,
        }
    }

    /// The session coordinator
    pub fn coordinator(&self) -> &LifecycleCoordinator {
        &self.coordinator
    }

    /// Current session state
    pub fn state(&self) -> LifecycleState {
        self.coordinator.state()
    }

    /// Whether the render thread is running
    pub fn is_rendering(&self) -> bool {
        self.render_loop.as_ref().is_some_and(RenderLoop::is_running)
    }

    /// Statistics of the render thread after it stopped
    pub fn last_frame_stats(&self) -> Option<FrameStats> {
        self.last_frame_stats
    }

    /// Currently selected dump destination
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Handle one host event
    pub fn handle_event(&mut self, event: HostEvent) -> Result<HostControl, HostError> {
        log::trace!("Host event: {:?}", event);
        match event {
            HostEvent::Created => self.on_create(),
            HostEvent::Resumed => {
                self.foreground = true;
                self.on_resume()
            }
            HostEvent::Paused => {
                self.foreground = false;
                self.coordinator.pause()?;
                Ok(HostControl::Continue)
            }
            HostEvent::Destroyed => self.on_destroy(),
            HostEvent::PermissionResult(result) => self.on_permission_result(result),
            HostEvent::SurfaceCreated => {
                self.driver.surface_created();
                Ok(HostControl::Continue)
            }
            HostEvent::SurfaceResized { width, height } => {
                self.driver.surface_resized(width, height);
                Ok(HostControl::Continue)
            }
            HostEvent::OutputPathSelected(path) => {
                log::info!("Dump destination set to {}", path.display());
                self.output_path = Some(path);
                Ok(HostControl::Continue)
            }
            HostEvent::DumpRequested => {
                self.try_dump();
                Ok(HostControl::Continue)
            }
            HostEvent::SettingsChanged => {
                self.coordinator.settings_changed();
                Ok(HostControl::Continue)
            }
            HostEvent::DepthVisualizationToggled(enabled) => {
                self.coordinator.features().set(FeatureFlags::DEPTH_VISUALIZATION, enabled);
                Ok(HostControl::Continue)
            }
            HostEvent::DepthOcclusionToggled(enabled) => {
                self.coordinator.features().set(FeatureFlags::DEPTH_OCCLUSION, enabled);
                Ok(HostControl::Continue)
            }
        }
    }

    fn on_create(&mut self) -> Result<HostControl, HostError> {
        self.coordinator.create()?;
        if self.render_loop.is_none() {
            self.render_loop = Some(RenderLoop::spawn(self.driver.clone(), &self.config.render)?);
        }
        Ok(HostControl::Continue)
    }

    fn on_resume(&mut self) -> Result<HostControl, HostError> {
        if !self.permissions.has_camera_permission() {
            self.permissions.request_camera_permission();
            return Ok(HostControl::AwaitingPermission);
        }

        match self.coordinator.resume() {
            Ok(()) => Ok(HostControl::Continue),
            Err(LifecycleError::ResourceAcquisition(message)) => {
                self.notices.show(Notice::Error(message));
                Ok(HostControl::Continue)
            }
            Err(LifecycleError::PermissionRequired) => {
                // Revoked between the check above and the transition
                self.permissions.request_camera_permission();
                Ok(HostControl::AwaitingPermission)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn on_permission_result(&mut self, result: PermissionResult) -> Result<HostControl, HostError> {
        if self.permissions.has_camera_permission() {
            if self.foreground && self.state() != LifecycleState::Resumed {
                return self.on_resume();
            }
            return Ok(HostControl::Continue);
        }

        self.notices.show(Notice::Message(PERMISSION_NEEDED.to_string()));
        if result.dont_ask_again {
            self.permissions.open_permission_settings();
        }
        Ok(HostControl::Finish)
    }

    fn on_destroy(&mut self) -> Result<HostControl, HostError> {
        self.foreground = false;
        self.coordinator.destroy()?;
        if let Some(render_loop) = self.render_loop.take() {
            self.last_frame_stats = Some(render_loop.stop());
        }
        Ok(HostControl::Finish)
    }

    fn try_dump(&self) {
        let Some(path) = self.output_path.as_ref() else {
            log::info!("Dump requested without an output path; ignoring");
            return;
        };

        match self.coordinator.request_dump(path) {
            Ok(()) => self.notices.show(Notice::Message(format!("Dumped data to {}", path.display()))),
            Err(e) => log::warn!("Dump not possible: {}", e),
        }
    }
}

impl Drop for SessionHost {
    fn drop(&mut self) {
        if self.render_loop.is_some() || self.state() != LifecycleState::Destroyed {
            if let Err(e) = self.on_destroy() {
                log::error!("Session host teardown failed: {}", e);
            }
        }
    }
}
