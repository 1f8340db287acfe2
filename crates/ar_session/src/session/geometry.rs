//! Display geometry change detection
//!
//! Two producers report geometry changes: the surface-resize callback (new pixel
//! dimensions) and the display listener (rotation only, e.g. a 180 degree flip
//! that leaves the surface size untouched). Both only mark the state dirty; the
//! render loop consumes it at most once per frame tick and forwards whatever is
//! current at that moment. No history is kept because only the latest viewport
//! matters to the native renderer.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Display rotation relative to the device's natural orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayRotation {
    /// Natural orientation
    #[default]
    Rotation0,
    /// Rotated 90 degrees
    Rotation90,
    /// Rotated 180 degrees (upside down)
    Rotation180,
    /// Rotated 270 degrees
    Rotation270,
}

impl DisplayRotation {
    /// Rotation in degrees
    pub fn degrees(self) -> u32 {
        match self {
            Self::Rotation0 => 0,
            Self::Rotation90 => 90,
            Self::Rotation180 => 180,
            Self::Rotation270 => 270,
        }
    }

    /// Parse a rotation in degrees; only right angles are valid
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Self::Rotation0),
            90 => Some(Self::Rotation90),
            180 => Some(Self::Rotation180),
            270 => Some(Self::Rotation270),
            _ => None,
        }
    }
}

impl fmt::Display for DisplayRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Geometry forwarded to the native session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    /// Current display rotation
    pub rotation: DisplayRotation,
    /// Drawable surface width in pixels
    pub width: u32,
    /// Drawable surface height in pixels
    pub height: u32,
}

impl DisplayGeometry {
    /// Create a geometry value
    pub fn new(rotation: DisplayRotation, width: u32, height: u32) -> Self {
        Self { rotation, width, height }
    }
}

/// Host query for the current display rotation
///
/// Called from the render thread at consumption time.
pub trait DisplayInfo: Send + Sync {
    /// Rotation of the default display right now
    fn current_rotation(&self) -> DisplayRotation;
}

#[derive(Debug, Default)]
struct PendingGeometry {
    changed: bool,
    /// Last surface size reported; `None` until the first resize callback
    size: Option<(u32, u32)>,
}

/// Coalesces geometry change notifications into one pending update
pub struct GeometryChangeDetector {
    pending: Mutex<PendingGeometry>,
    display: Arc<dyn DisplayInfo>,
}

impl GeometryChangeDetector {
    /// Create a detector that re-queries rotation from `display`
    pub fn new(display: Arc<dyn DisplayInfo>) -> Self {
        Self {
            pending: Mutex::new(PendingGeometry::default()),
            display,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PendingGeometry> {
        // The pending state is two plain values; a panic mid-update cannot break it.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Surface was resized; record the new dimensions
    pub fn notify_surface_resized(&self, width: u32, height: u32) {
        log::debug!("Surface resized to {}x{}", width, height);
        let mut pending = self.lock();
        pending.size = Some((width, height));
        pending.changed = true;
    }

    /// Display changed without a resize; rotation is re-queried on consumption
    pub fn notify_display_changed(&self) {
        log::debug!("Display changed; geometry marked dirty");
        self.lock().changed = true;
    }

    /// Whether an update is waiting to be consumed
    pub fn is_pending(&self) -> bool {
        self.lock().changed
    }

    /// Take the pending update, if any, clearing the flag
    ///
    /// Only the render loop calls this. While no surface size has been reported
    /// yet the flag stays set, so the first real resize is never lost.
    pub fn consume_if_changed(&self) -> Option<DisplayGeometry> {
        let (width, height) = {
            let mut pending = self.lock();
            if !pending.changed {
                return None;
            }
            let size = pending.size?;
            pending.changed = false;
            size
        };

        // Queried after the flag is cleared: a rotation landing in between
        // re-marks the state and costs one redundant update at worst.
        let rotation = self.display.current_rotation();
        Some(DisplayGeometry::new(rotation, width, height))
    }
}

impl fmt::Debug for GeometryChangeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryChangeDetector")
            .field("pending", &*self.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Display whose rotation can be changed from the test
    struct TestDisplay {
        degrees: AtomicU32,
    }

    impl TestDisplay {
        fn new(rotation: DisplayRotation) -> Arc<Self> {
            Arc::new(Self { degrees: AtomicU32::new(rotation.degrees()) })
        }

        fn rotate_to(&self, rotation: DisplayRotation) {
            self.degrees.store(rotation.degrees(), Ordering::SeqCst);
        }
    }

    impl DisplayInfo for TestDisplay {
        fn current_rotation(&self) -> DisplayRotation {
            DisplayRotation::from_degrees(self.degrees.load(Ordering::SeqCst)).unwrap()
        }
    }

    #[test]
    fn test_rotation_conversions() {
        assert_eq!(DisplayRotation::from_degrees(270), Some(DisplayRotation::Rotation270));
        assert_eq!(DisplayRotation::from_degrees(450), Some(DisplayRotation::Rotation90));
        assert_eq!(DisplayRotation::from_degrees(45), None);
        assert_eq!(DisplayRotation::Rotation90.to_string(), "90°");
    }

    #[test]
    fn test_no_change_without_notification() {
        let detector = GeometryChangeDetector::new(TestDisplay::new(DisplayRotation::Rotation0));
        assert!(!detector.is_pending());
        assert_eq!(detector.consume_if_changed(), None);
    }

    #[test]
    fn test_notifications_coalesce_to_latest() {
        let display = TestDisplay::new(DisplayRotation::Rotation90);
        let detector = GeometryChangeDetector::new(display);

        detector.notify_surface_resized(100, 200);
        detector.notify_display_changed();
        detector.notify_surface_resized(300, 400);

        assert_eq!(
            detector.consume_if_changed(),
            Some(DisplayGeometry::new(DisplayRotation::Rotation90, 300, 400))
        );
        assert_eq!(detector.consume_if_changed(), None);
    }

    #[test]
    fn test_rotation_without_resize_requeries_rotation() {
        let display = TestDisplay::new(DisplayRotation::Rotation0);
        let detector = GeometryChangeDetector::new(display.clone());

        detector.notify_surface_resized(1080, 1920);
        assert_eq!(
            detector.consume_if_changed(),
            Some(DisplayGeometry::new(DisplayRotation::Rotation0, 1080, 1920))
        );

        // 180 degree flip: no resize callback, only a display change
        display.rotate_to(DisplayRotation::Rotation180);
        detector.notify_display_changed();

        assert_eq!(
            detector.consume_if_changed(),
            Some(DisplayGeometry::new(DisplayRotation::Rotation180, 1080, 1920))
        );
    }

    #[test]
    fn test_display_change_before_first_resize_is_deferred() {
        let detector = GeometryChangeDetector::new(TestDisplay::new(DisplayRotation::Rotation0));

        detector.notify_display_changed();
        assert_eq!(detector.consume_if_changed(), None);
        assert!(detector.is_pending());

        detector.notify_surface_resized(640, 480);
        assert_eq!(
            detector.consume_if_changed(),
            Some(DisplayGeometry::new(DisplayRotation::Rotation0, 640, 480))
        );
        assert!(!detector.is_pending());
    }

    #[test]
    fn test_concurrent_producers_leave_one_update() {
        let detector = Arc::new(GeometryChangeDetector::new(TestDisplay::new(DisplayRotation::Rotation0)));

        let producers: Vec<_> = (0..4u32)
            .map(|i| {
                let detector = Arc::clone(&detector);
                std::thread::spawn(move || {
                    for n in 0..100 {
                        if n % 2 == 0 {
                            detector.notify_surface_resized(100 + i, 100 + n);
                        } else {
                            detector.notify_display_changed();
                        }
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        assert!(detector.consume_if_changed().is_some());
        assert_eq!(detector.consume_if_changed(), None);
    }
}
