//! Logging utilities

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    // A host may already have installed a logger; keep theirs.
    let _ = env_logger::try_init();
}

/// Initialize logging with an explicit filter string (e.g. `"info"` or `"ar_session=debug"`)
///
/// `RUST_LOG` still wins when it is set, so the configured level acts as a default.
pub fn init_with_filter(filter: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filter);
    if let Ok(env_filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&env_filter);
    }
    let _ = builder.try_init();
}
