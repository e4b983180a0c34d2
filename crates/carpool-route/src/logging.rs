//! Logging set-up for the command line tool
//!
//! Logs go to stderr so that the JSON report on stdout stays clean. `RUST_LOG`
//! overrides the default filter. With the `profiling` feature the library's
//! profiling scopes become tracing spans, and their timings are printed when
//! they close.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn setup_logging() {
    let fmt_layer = fmt::layer().with_writer(std::io::stderr);

    #[cfg(feature = "profiling")]
    let fmt_layer = fmt_layer.with_span_events(fmt::format::FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry().with(fmt_layer.with_filter(env_filter()));
    if registry.try_init().is_err() {
        tracing::warn!("Logging was already initialized");
        return;
    }

    #[cfg(feature = "profiling")]
    tracing::info!("Logging initialized with profiling spans");
    #[cfg(not(feature = "profiling"))]
    tracing::debug!("Logging initialized (profiling disabled in this build)");
}
