//! Render loop driver
//!
//! A frame tick borrows the native session under the same lock `destroy()`
//! takes. It applies any pending geometry change, then renders one frame with
//! the current feature toggles. Ticks never fail the loop: an error or a panic
//! from the native side costs one frame and is logged.
//!
//! [`RenderLoop`] runs ticks on a dedicated thread at a fixed cadence. Hosts
//! with their own vsync callback can call [`RenderLoopDriver::tick`] directly
//! instead.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

use crate::core::RenderLoopConfig;
use crate::foundation::time::{FramePacer, Timer};

use super::geometry::DisplayGeometry;
use super::lifecycle::{ActivePhase, SessionShared, SessionSlot};
use super::native::NativeError;

thread_local! {
    static RENDER_THREAD: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is a render loop thread
pub(crate) fn on_render_thread() -> bool {
    RENDER_THREAD.with(Cell::get)
}

/// Mark the current thread as a render loop thread
pub(crate) fn mark_render_thread() {
    RENDER_THREAD.with(|flag| flag.set(true));
}

/// Why a tick did not touch the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Session not created yet, or already destroyed
    NoSession,
    /// Session exists but is not resumed
    NotResumed,
}

/// Result of one frame tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was rendered, after applying `geometry` when it had changed
    Rendered {
        /// Geometry forwarded to the session before rendering
        geometry: Option<DisplayGeometry>,
    },
    /// The session was not accessed
    Skipped(SkipReason),
}

/// Failure inside a single frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The native renderer reported an error
    #[error("Native frame error: {0}")]
    Native(#[from] NativeError),

    /// The native renderer panicked
    #[error("Frame panicked: {0}")]
    Panicked(String),
}

/// Per-tick access to the session for the render thread
#[derive(Clone)]
pub struct RenderLoopDriver {
    shared: Arc<SessionShared>,
}

impl RenderLoopDriver {
    pub(crate) fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    /// The graphics surface was created; forwarded when a session exists
    pub fn surface_created(&self) {
        if let SessionSlot::Active(active) = &mut *self.shared.lock_slot() {
            active.session.on_surface_created();
        }
    }

    /// The graphics surface was resized
    pub fn surface_resized(&self, width: u32, height: u32) {
        self.shared.geometry.notify_surface_resized(width, height);
    }

    /// Run one frame tick
    ///
    /// Returns without touching the session when it is absent or not resumed.
    /// Native errors and panics are caught and returned as [`FrameError`].
    pub fn tick(&self) -> Result<FrameOutcome, FrameError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.render_frame())) {
            Ok(result) => result,
            Err(payload) => Err(FrameError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    fn render_frame(&self) -> Result<FrameOutcome, FrameError> {
        let mut slot = self.shared.lock_slot();
        let active = match &mut *slot {
            SessionSlot::Active(active) => active,
            SessionSlot::Uninitialized | SessionSlot::Destroyed => {
                return Ok(FrameOutcome::Skipped(SkipReason::NoSession));
            }
        };
        if active.phase != ActivePhase::Resumed {
            // Pending geometry stays queued for the first resumed frame.
            return Ok(FrameOutcome::Skipped(SkipReason::NotResumed));
        }

        let geometry = self.shared.geometry.consume_if_changed();
        if let Some(geometry) = geometry {
            log::debug!(
                "Applying display geometry {}x{} at {}",
                geometry.width, geometry.height, geometry.rotation
            );
            active.session.on_geometry_changed(geometry);
        }

        active.session.on_draw_frame(self.shared.features.snapshot())?;
        Ok(FrameOutcome::Rendered { geometry })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Counters collected by a [`RenderLoop`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames rendered
    pub rendered: u64,
    /// Ticks that did not touch the session
    pub skipped: u64,
    /// Ticks that failed and were dropped
    pub failed: u64,
    /// Geometry updates forwarded to the session
    pub geometry_updates: u64,
    /// Average tick rate over the loop's lifetime
    pub average_fps: f32,
}

impl FrameStats {
    /// Record the result of one tick
    pub fn record(&mut self, result: &Result<FrameOutcome, FrameError>) {
        match result {
            Ok(FrameOutcome::Rendered { geometry }) => {
                self.rendered += 1;
                if geometry.is_some() {
                    self.geometry_updates += 1;
                }
            }
            Ok(FrameOutcome::Skipped(_)) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Total ticks recorded
    pub fn total(&self) -> u64 {
        self.rendered + self.skipped + self.failed
    }
}

/// Free-running render thread
///
/// Ticks at the configured cadence until [`RenderLoop::stop`] is called or the
/// loop is dropped. There is no other cancellation: once the session is
/// destroyed every tick simply returns early.
pub struct RenderLoop {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<FrameStats>>,
}

impl RenderLoop {
    /// Spawn the render thread
    pub fn spawn(driver: RenderLoopDriver, config: &RenderLoopConfig) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let worker_config = config.clone();

        let thread = thread::Builder::new()
            .name("ar-render".to_string())
            .spawn(move || run_loop(&driver, &worker_config, &worker_stop))?;

        log::info!("Render loop started at {} fps", config.target_fps);
        Ok(Self { stop, thread: Some(thread) })
    }

    /// Whether the render thread is still running
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    /// Stop the render thread and return its statistics
    pub fn stop(mut self) -> FrameStats {
        self.shutdown()
    }

    fn shutdown(&mut self) -> FrameStats {
        self.stop.store(true, Ordering::Release);
        let Some(thread) = self.thread.take() else {
            return FrameStats::default();
        };
        match thread.join() {
            Ok(stats) => {
                log::info!(
                    "Render loop stopped: {} rendered, {} skipped, {} failed ({:.1} fps)",
                    stats.rendered, stats.skipped, stats.failed, stats.average_fps
                );
                stats
            }
            Err(_) => {
                log::error!("Render thread terminated abnormally");
                FrameStats::default()
            }
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(driver: &RenderLoopDriver, config: &RenderLoopConfig, stop: &AtomicBool) -> FrameStats {
    mark_render_thread();

    let mut pacer = FramePacer::new(config.target_fps);
    let mut timer = Timer::new();
    let mut stats = FrameStats::default();

    while !stop.load(Ordering::Acquire) {
        timer.update();
        let result = driver.tick();
        if let Err(e) = &result {
            log::warn!("Frame {} skipped: {}", timer.frame_count(), e);
        }
        stats.record(&result);

        if config.report_interval_frames > 0 && timer.frame_count() % config.report_interval_frames == 0 {
            log::debug!(
                "Frame stats: {} rendered, {} skipped, {} failed, {:.1} fps",
                stats.rendered, stats.skipped, stats.failed, timer.average_fps()
            );
        }

        pacer.wait_for_next_slot();
    }

    stats.average_fps = timer.average_fps();
    stats
}
