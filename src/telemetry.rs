//! Telemetry initialization (structured logging).

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize structured logging.
/// Log level is controlled via `RUST_LOG` (defaults to `info`).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
