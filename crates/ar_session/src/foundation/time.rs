//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
#[derive(Debug)]
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (call once per frame tick)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Time since the previous tick in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total elapsed time across all ticks
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of ticks recorded
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average tick rate since the timer was created
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Fixed-cadence pacer for a free-running loop
///
/// Sleeps away whatever is left of the frame interval after the work of a tick.
/// A tick that overruns its slot is not compensated; the next slot starts from now.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    slot_start: Instant,
}

impl FramePacer {
    /// Create a pacer targeting `fps` ticks per second
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / fps.max(1),
            slot_start: Instant::now(),
        }
    }

    /// Interval between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left in the current slot
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.slot_start.elapsed())
    }

    /// Block until the current slot is over and start the next one
    pub fn wait_for_next_slot(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.slot_start = Instant::now();
    }
}
