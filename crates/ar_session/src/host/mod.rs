//! Host glue
//!
//! Maps the host's lifecycle and windowing callbacks onto the session
//! coordinator: permission handling around resume, user-facing notices, the
//! render thread's lifetime, and the settings/data-dump menu actions.

mod events;
mod session_host;

pub use events::{HostControl, HostError, HostEvent, Notice, NoticeSink};
pub use session_host::SessionHost;
