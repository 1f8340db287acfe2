//! Test doubles for the native session and host collaborators

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::SessionConfig;
use crate::session::{
    DisplayEventHub, DisplayGeometry, DisplayInfo, DisplayRotation, FeatureFlags,
    LifecycleCoordinator, NativeError, NativeSession, PermissionGate, SessionCollaborators,
};

/// Everything a [`ProbeSession`] did, observable after it is gone
#[derive(Default)]
pub struct SessionProbe {
    pub created: AtomicUsize,
    pub resumes: AtomicUsize,
    pub pauses: AtomicUsize,
    pub destroys: AtomicUsize,
    pub surfaces_created: AtomicUsize,
    pub frames: AtomicUsize,
    pub accesses_after_destroy: AtomicUsize,
    pub geometry: Mutex<Vec<DisplayGeometry>>,
    pub features: Mutex<Vec<FeatureFlags>>,
    pub dumps: Mutex<Vec<PathBuf>>,
    pub assets_dir: Mutex<Option<PathBuf>>,
    pub destroyed: AtomicBool,
    pub fail_resume: AtomicBool,
    pub fail_frames: AtomicBool,
    pub panic_frames: AtomicBool,
}

impl SessionProbe {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn geometry_log(&self) -> Vec<DisplayGeometry> {
        self.geometry.lock().unwrap().clone()
    }
}

/// Native session stand-in that records every call into a shared probe
pub struct ProbeSession {
    probe: Arc<SessionProbe>,
}

impl ProbeSession {
    fn touch(&self) {
        if self.probe.destroyed.load(Ordering::SeqCst) {
            self.probe.accesses_after_destroy.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl NativeSession for ProbeSession {
    fn resume(&mut self) -> Result<(), NativeError> {
        self.touch();
        if self.probe.fail_resume.load(Ordering::SeqCst) {
            return Err(NativeError::CameraUnavailable("camera in use by another app".to_string()));
        }
        self.probe.resumes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.touch();
        self.probe.pauses.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(self: Box<Self>) {
        self.touch();
        self.probe.destroys.fetch_add(1, Ordering::SeqCst);
        self.probe.destroyed.store(true, Ordering::SeqCst);
    }

    fn on_surface_created(&mut self) {
        self.touch();
        self.probe.surfaces_created.fetch_add(1, Ordering::SeqCst);
    }

    fn on_geometry_changed(&mut self, geometry: DisplayGeometry) {
        self.touch();
        self.probe.geometry.lock().unwrap().push(geometry);
    }

    fn on_draw_frame(&mut self, features: FeatureFlags) -> Result<(), NativeError> {
        self.touch();
        if self.probe.panic_frames.load(Ordering::SeqCst) {
            panic!("native renderer crashed");
        }
        if self.probe.fail_frames.load(Ordering::SeqCst) {
            return Err(NativeError::Session("update failed".to_string()));
        }
        self.probe.frames.fetch_add(1, Ordering::SeqCst);
        self.probe.features.lock().unwrap().push(features);
        Ok(())
    }

    fn is_depth_supported(&self) -> bool {
        self.touch();
        true
    }

    fn request_dump(&mut self, destination: &Path) {
        self.touch();
        self.probe.dumps.lock().unwrap().push(destination.to_path_buf());
    }
}

/// Permission gate the test can flip
#[derive(Default)]
pub struct TestPermissions {
    pub granted: AtomicBool,
    pub requests: AtomicUsize,
    pub settings_opened: AtomicUsize,
}

impl TestPermissions {
    pub fn new(granted: bool) -> Arc<Self> {
        let permissions = Self::default();
        permissions.granted.store(granted, Ordering::SeqCst);
        Arc::new(permissions)
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

impl PermissionGate for TestPermissions {
    fn has_camera_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_camera_permission(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn open_permission_settings(&self) {
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
    }
}

/// Display whose rotation the test controls
pub struct TestDisplay {
    degrees: AtomicU32,
}

impl TestDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { degrees: AtomicU32::new(0) })
    }

    pub fn rotate_to(&self, rotation: DisplayRotation) {
        self.degrees.store(rotation.degrees(), Ordering::SeqCst);
    }
}

impl DisplayInfo for TestDisplay {
    fn current_rotation(&self) -> DisplayRotation {
        DisplayRotation::from_degrees(self.degrees.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// A coordinator wired to test doubles
pub struct Harness {
    pub coordinator: LifecycleCoordinator,
    pub probe: Arc<SessionProbe>,
    pub permissions: Arc<TestPermissions>,
    pub displays: Arc<DisplayEventHub>,
    pub display: Arc<TestDisplay>,
}

impl Harness {
    pub fn new(permission_granted: bool) -> Self {
        Self::with_config(permission_granted, &SessionConfig::default())
    }

    pub fn with_config(permission_granted: bool, config: &SessionConfig) -> Self {
        let probe = Arc::new(SessionProbe::default());
        let permissions = TestPermissions::new(permission_granted);
        let displays = Arc::new(DisplayEventHub::new());
        let display = TestDisplay::new();

        let factory_probe = Arc::clone(&probe);
        let factory = move |assets_dir: &Path| -> Box<dyn NativeSession> {
            factory_probe.created.fetch_add(1, Ordering::SeqCst);
            *factory_probe.assets_dir.lock().unwrap() = Some(assets_dir.to_path_buf());
            Box::new(ProbeSession { probe: Arc::clone(&factory_probe) })
        };

        let coordinator = LifecycleCoordinator::new(
            SessionCollaborators {
                factory: Box::new(factory),
                permissions: permissions.clone(),
                displays: displays.clone(),
                display_info: display.clone(),
            },
            config,
        );

        Self { coordinator, probe, permissions, displays, display }
    }
}
