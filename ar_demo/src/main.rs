//! AR session demo
//!
//! Plays a typical screen lifetime against a simulated native session:
//! create, permission prompt, resume, a 180 degree rotation, a data dump,
//! background/foreground, and teardown, with the render thread running the
//! whole time.
//!
//! Usage: `ar_demo [config.toml|config.ron]`

mod simulated;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ar_session::foundation::logging;
use ar_session::prelude::*;
use thiserror::Error;

use simulated::{SimulatedDisplay, SimulatedPermissions, SimulatedSession};

#[derive(Error, Debug)]
enum DemoError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

fn main() {
    if let Err(e) = run() {
        log::error!("Demo failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), DemoError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::load(&path)?,
        None => SessionConfig::default(),
    };
    logging::init_with_filter(&config.log_level);
    log::info!("Starting AR session demo");

    let (events, queue) = mpsc::channel();
    let (notices, notice_rx) = mpsc::channel();
    let permissions = Arc::new(SimulatedPermissions::new(events));
    let displays = Arc::new(DisplayEventHub::new());
    let display = Arc::new(SimulatedDisplay::default());
    let frames = Arc::new(AtomicU64::new(0));

    let factory_frames = Arc::clone(&frames);
    let coordinator = LifecycleCoordinator::new(
        SessionCollaborators {
            factory: Box::new(move |assets_dir: &Path| -> Box<dyn NativeSession> {
                Box::new(SimulatedSession::new(assets_dir, Arc::clone(&factory_frames)))
            }),
            permissions: permissions.clone(),
            displays: displays.clone(),
            display_info: display.clone(),
        },
        &config,
    );
    let mut host = SessionHost::new(coordinator, permissions, Box::new(notices), config);

    let mut deliver = |event: HostEvent| -> Result<HostControl, DemoError> {
        let mut last = host.handle_event(event)?;
        // Follow-up events (permission answers) are delivered before the next callback
        for follow_up in drain(&queue) {
            last = host.handle_event(follow_up)?;
        }
        Ok(last)
    };

    deliver(HostEvent::Created)?;
    deliver(HostEvent::SurfaceCreated)?;
    deliver(HostEvent::SurfaceResized { width: 1080, height: 1920 })?;
    if deliver(HostEvent::Resumed)? == HostControl::Finish {
        log::warn!("Screen finished before the session started");
        return Ok(());
    }
    thread::sleep(Duration::from_millis(300));

    log::info!("Rotating display by 180 degrees");
    display.rotate_to(DisplayRotation::Rotation180);
    displays.emit(DisplayEvent::Changed(0));
    thread::sleep(Duration::from_millis(100));

    deliver(HostEvent::DepthVisualizationToggled(true))?;
    deliver(HostEvent::SettingsChanged)?;
    deliver(HostEvent::OutputPathSelected(PathBuf::from("dumps")))?;
    deliver(HostEvent::DumpRequested)?;
    thread::sleep(Duration::from_millis(200));

    deliver(HostEvent::Paused)?;
    let frames_while_paused = frames.load(Ordering::Relaxed);
    thread::sleep(Duration::from_millis(200));
    log::info!(
        "Frames rendered while paused: {}",
        frames.load(Ordering::Relaxed) - frames_while_paused
    );

    deliver(HostEvent::Resumed)?;
    thread::sleep(Duration::from_millis(200));
    deliver(HostEvent::Destroyed)?;

    for notice in notice_rx.try_iter() {
        match notice {
            Notice::Error(message) => log::error!("[notice] {}", message),
            Notice::Message(message) => log::info!("[notice] {}", message),
        }
    }
    if let Some(stats) = host.last_frame_stats() {
        log::info!(
            "Render loop: {} rendered, {} skipped, {} failed, {} geometry updates, {:.1} fps",
            stats.rendered, stats.skipped, stats.failed, stats.geometry_updates, stats.average_fps
        );
    }
    log::info!("Demo complete");
    Ok(())
}

fn drain(queue: &Receiver<HostEvent>) -> Vec<HostEvent> {
    queue.try_iter().collect()
}
