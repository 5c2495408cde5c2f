//! Tracing subscriber bootstrap for sentinel daemons.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize structured logging with JSON output.
///
/// Production configuration: JSON lines suitable for log shipper / SIEM
/// ingestion. Filtering honors `RUST_LOG`, falling back to `log_level`.
/// Call once at daemon startup.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json(),
        )
        .init();
}

/// Initialize logging with human-readable output for development.
///
/// Same filtering behavior as [`init_logging`], pretty-printed for a
/// terminal instead of JSON.
pub fn init_logging_pretty(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .init();
}
