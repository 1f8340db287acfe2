//! Feature toggles passed to every frame render
//!
//! The UI thread flips toggles (e.g. the depth switch) while the render thread
//! reads them once per tick, so they live in a single atomic word.

use std::sync::atomic::{AtomicU8, Ordering};

bitflags::bitflags! {
    /// Per-frame rendering features
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureFlags: u8 {
        /// Colorize the depth image over the camera background
        const DEPTH_VISUALIZATION = 1 << 0;
        /// Use depth for occlusion of virtual content
        const DEPTH_OCCLUSION = 1 << 1;
    }
}

/// Lock-free toggle set shared between the UI and render threads
#[derive(Debug)]
pub struct FeatureToggles {
    bits: AtomicU8,
}

impl FeatureToggles {
    /// Create toggles with an initial flag set
    pub fn new(initial: FeatureFlags) -> Self {
        Self { bits: AtomicU8::new(initial.bits()) }
    }

    /// Flags as seen by the next frame
    pub fn snapshot(&self) -> FeatureFlags {
        FeatureFlags::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// Turn one or more flags on or off
    pub fn set(&self, flags: FeatureFlags, enabled: bool) {
        if enabled {
            self.bits.fetch_or(flags.bits(), Ordering::AcqRel);
        } else {
            self.bits.fetch_and(!flags.bits(), Ordering::AcqRel);
        }
    }
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self::new(FeatureFlags::empty())
    }
}
