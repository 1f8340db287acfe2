//! Render thread vs. lifecycle races

use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use super::support::{Harness, SessionProbe};
use crate::core::RenderLoopConfig;
use crate::session::render_loop::mark_render_thread;
use crate::session::{FrameOutcome, LifecycleError, LifecycleState, RenderLoop, SkipReason};

const TICK_THREADS: usize = 8;
const TICKS_PER_THREAD: usize = 300;

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[test]
fn test_ticks_racing_destroy_never_touch_destroyed_session() {
    for _ in 0..10 {
        let mut h = Harness::new(true);
        h.coordinator.create().unwrap();
        h.coordinator.resume().unwrap();
        h.coordinator.geometry().notify_surface_resized(1080, 1920);

        let start = Arc::new(Barrier::new(TICK_THREADS + 1));
        let tickers: Vec<_> = (0..TICK_THREADS)
            .map(|_| {
                let driver = h.coordinator.render_driver();
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    let mut saw_absent = false;
                    for _ in 0..TICKS_PER_THREAD {
                        match driver.tick().unwrap() {
                            FrameOutcome::Rendered { .. } => {
                                assert!(!saw_absent, "rendered after the session was gone");
                            }
                            FrameOutcome::Skipped(SkipReason::NoSession) => saw_absent = true,
                            FrameOutcome::Skipped(SkipReason::NotResumed) => {}
                        }
                    }
                })
            })
            .collect();

        start.wait();
        thread::sleep(Duration::from_micros(200));
        h.coordinator.destroy().unwrap();
        let frames_at_destroy = SessionProbe::count(&h.probe.frames);

        for ticker in tickers {
            ticker.join().unwrap();
        }

        assert_eq!(SessionProbe::count(&h.probe.accesses_after_destroy), 0);
        assert_eq!(SessionProbe::count(&h.probe.frames), frames_at_destroy);
        assert_eq!(SessionProbe::count(&h.probe.destroys), 1);
    }
}

#[test]
fn test_render_loop_runs_and_survives_bad_frames() {
    let mut h = Harness::new(true);
    let driver = h.coordinator.render_driver();
    driver.surface_resized(800, 600);

    let config = RenderLoopConfig::new().with_target_fps(240).with_report_interval(0);
    let render_loop = RenderLoop::spawn(driver, &config).unwrap();
    assert!(render_loop.is_running());

    h.coordinator.create().unwrap();
    h.coordinator.resume().unwrap();
    assert!(wait_until(Duration::from_secs(5), || SessionProbe::count(&h.probe.frames) >= 3));

    h.probe.fail_frames.store(true, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(30));
    h.probe.fail_frames.store(false, Ordering::SeqCst);

    let frames_after_failures = SessionProbe::count(&h.probe.frames);
    assert!(wait_until(Duration::from_secs(5), || {
        SessionProbe::count(&h.probe.frames) > frames_after_failures
    }));
    assert!(render_loop.is_running());

    h.coordinator.pause().unwrap();
    h.coordinator.destroy().unwrap();
    let stats = render_loop.stop();

    assert!(stats.rendered >= 4);
    assert!(stats.failed >= 1);
    assert_eq!(stats.geometry_updates, 1);
    assert_eq!(stats.total(), stats.rendered + stats.skipped + stats.failed);
    assert_eq!(SessionProbe::count(&h.probe.accesses_after_destroy), 0);
}

#[test]
fn test_render_loop_survives_panicking_frames() {
    let mut h = Harness::new(true);
    let config = RenderLoopConfig::new().with_target_fps(240);
    let render_loop = RenderLoop::spawn(h.coordinator.render_driver(), &config).unwrap();

    h.coordinator.create().unwrap();
    h.coordinator.resume().unwrap();
    h.probe.panic_frames.store(true, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    h.probe.panic_frames.store(false, Ordering::SeqCst);

    let frames = SessionProbe::count(&h.probe.frames);
    assert!(wait_until(Duration::from_secs(5), || SessionProbe::count(&h.probe.frames) > frames));
    assert!(render_loop.is_running());

    h.coordinator.destroy().unwrap();
    let stats = render_loop.stop();
    assert!(stats.failed >= 1);
}

#[test]
fn test_lifecycle_refused_on_render_thread() {
    let mut h = Harness::new(true);
    h.coordinator.create().unwrap();
    let coordinator = h.coordinator;

    let coordinator = thread::spawn(move || {
        let mut coordinator = coordinator;
        mark_render_thread();
        assert_eq!(coordinator.resume(), Err(LifecycleError::WrongThread("resume")));
        assert_eq!(coordinator.pause(), Err(LifecycleError::WrongThread("pause")));
        assert_eq!(coordinator.destroy(), Err(LifecycleError::WrongThread("destroy")));
        assert_eq!(coordinator.create(), Err(LifecycleError::WrongThread("create")));
        coordinator
    })
    .join()
    .unwrap();

    assert_eq!(coordinator.state(), LifecycleState::Created);
    let mut coordinator = coordinator;
    coordinator.destroy().unwrap();
    assert_eq!(SessionProbe::count(&h.probe.destroys), 1);
}
