//! Display event delivery
//!
//! The windowing layer reports display added/removed/changed notifications.
//! Only `Changed` matters to the session: it is how a 180 degree rotation is
//! noticed, since that flip neither resizes the surface nor triggers a
//! configuration change.
//!
//! Listeners are registered while the session is resumed and removed on pause
//! and destroy, so no callback can fire into a session that is about to go away.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::geometry::GeometryChangeDetector;

/// Display identifier assigned by the host
pub type DisplayId = u32;

/// Notification from the host display manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// A display was connected
    Added(DisplayId),
    /// A display was disconnected
    Removed(DisplayId),
    /// A display changed (rotation, mode, ...)
    Changed(DisplayId),
}

/// Handle identifying a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Feeds display change notifications into a geometry detector
#[derive(Debug, Clone)]
pub struct DisplayListener {
    detector: Arc<GeometryChangeDetector>,
}

impl DisplayListener {
    /// Create a listener forwarding to `detector`
    pub fn new(detector: Arc<GeometryChangeDetector>) -> Self {
        Self { detector }
    }

    /// Handle one display event
    pub fn on_display_event(&self, event: DisplayEvent) {
        match event {
            DisplayEvent::Changed(_) => self.detector.notify_display_changed(),
            DisplayEvent::Added(_) | DisplayEvent::Removed(_) => {}
        }
    }
}

/// Host-side source of display notifications
///
/// Callbacks may be delivered on any thread.
pub trait DisplayEventSource: Send + Sync {
    /// Start delivering display events to `listener`
    fn register_listener(&self, listener: DisplayListener) -> ListenerId;

    /// Stop delivering events to a listener; unknown ids are ignored
    fn unregister_listener(&self, id: ListenerId);
}

/// In-process display event source
///
/// Supports immediate delivery with [`DisplayEventHub::emit`] and queued
/// delivery with [`DisplayEventHub::send`] followed by
/// [`DisplayEventHub::dispatch`], for hosts that pump notifications from their
/// own loop.
#[derive(Debug, Default)]
pub struct DisplayEventHub {
    listeners: Mutex<HashMap<ListenerId, DisplayListener>>,
    queue: Mutex<Vec<DisplayEvent>>,
    next_id: AtomicU64,
}

impl DisplayEventHub {
    /// Create a hub with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<ListenerId, DisplayListener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn queue(&self) -> MutexGuard<'_, Vec<DisplayEvent>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    /// Deliver an event to every listener now
    pub fn emit(&self, event: DisplayEvent) {
        // Snapshot so a listener can (un)register without deadlocking the hub.
        let listeners: Vec<DisplayListener> = self.listeners().values().cloned().collect();
        for listener in &listeners {
            listener.on_display_event(event);
        }
    }

    /// Queue an event for the next [`DisplayEventHub::dispatch`]
    pub fn send(&self, event: DisplayEvent) {
        self.queue().push(event);
    }

    /// Deliver all queued events in order; returns how many were delivered
    pub fn dispatch(&self) -> usize {
        let pending = std::mem::take(&mut *self.queue());
        for event in &pending {
            self.emit(*event);
        }
        pending.len()
    }

    /// Drop queued events without delivering them
    pub fn clear(&self) {
        self.queue().clear();
    }
}

impl DisplayEventSource for DisplayEventHub {
    fn register_listener(&self, listener: DisplayListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners().insert(id, listener);
        log::debug!("Display listener {:?} registered", id);
        id
    }

    fn unregister_listener(&self, id: ListenerId) {
        if self.listeners().remove(&id).is_some() {
            log::debug!("Display listener {:?} unregistered", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::geometry::{DisplayInfo, DisplayRotation};

    struct FixedDisplay;

    impl DisplayInfo for FixedDisplay {
        fn current_rotation(&self) -> DisplayRotation {
            DisplayRotation::Rotation0
        }
    }

    fn detector() -> Arc<GeometryChangeDetector> {
        let detector = Arc::new(GeometryChangeDetector::new(Arc::new(FixedDisplay)));
        detector.notify_surface_resized(800, 600);
        let _ = detector.consume_if_changed();
        detector
    }

    #[test]
    fn test_only_changed_marks_geometry() {
        let detector = detector();
        let hub = DisplayEventHub::new();
        hub.register_listener(DisplayListener::new(Arc::clone(&detector)));

        hub.emit(DisplayEvent::Added(1));
        hub.emit(DisplayEvent::Removed(1));
        assert!(!detector.is_pending());

        hub.emit(DisplayEvent::Changed(0));
        assert!(detector.is_pending());
    }

    #[test]
    fn test_unregistered_listener_receives_nothing() {
        let detector = detector();
        let hub = DisplayEventHub::new();
        let id = hub.register_listener(DisplayListener::new(Arc::clone(&detector)));
        assert_eq!(hub.listener_count(), 1);

        hub.unregister_listener(id);
        hub.unregister_listener(id);
        assert_eq!(hub.listener_count(), 0);

        hub.emit(DisplayEvent::Changed(0));
        assert!(!detector.is_pending());
    }

    #[test]
    fn test_queued_dispatch() {
        let detector = detector();
        let hub = DisplayEventHub::new();
        hub.register_listener(DisplayListener::new(Arc::clone(&detector)));

        hub.send(DisplayEvent::Changed(0));
        assert!(!detector.is_pending());

        assert_eq!(hub.dispatch(), 1);
        assert!(detector.is_pending());
        assert_eq!(hub.dispatch(), 0);
    }

    #[test]
    fn test_clear_drops_queued_events() {
        let detector = detector();
        let hub = DisplayEventHub::new();
        hub.register_listener(DisplayListener::new(Arc::clone(&detector)));

        hub.send(DisplayEvent::Changed(0));
        hub.clear();
        assert_eq!(hub.dispatch(), 0);
        assert!(!detector.is_pending());
    }
}
