//! Log subscriber setup.
//!
//! stdout carries the diagnostics, so logs always go to stderr.

use std::io;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter (`warn`, `debug`, `tsc_stdin_tsserver=trace`, ...).
pub const LOG_ENV: &str = "TSC_STDIN_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Build the filter from [`LOG_ENV`], falling back to `warn` when unset or invalid.
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a compact stderr subscriber.
pub fn init() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(layer.with_filter(filter_from_env()))
        .init();
}
