//! # kanascribe-logging
//!
//! Structured logging with `tracing`.
//!
//! Request context (file id, request id) is carried by spans opened in the
//! server's pipeline; this crate only installs the global subscriber.

#![deny(unsafe_code)]

use kanascribe_settings::{LogFormat, LoggingSettings};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Build the filter: `RUST_LOG` when set and valid, else `level`.
///
/// An unparsable `level` falls back to `info`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber writing to stderr.
///
/// Call once at application startup. Subsequent calls are no-ops.
pub fn init_subscriber(settings: &LoggingSettings) {
    let filter = env_filter(&settings.level);

    // try_init is a no-op if a global subscriber is already set
    match settings.format {
        LogFormat::Compact => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact()
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .try_init();
        }
    }
}

/// Warn-level subscriber for the window before settings are loaded.
pub fn bootstrap_subscriber<W>(make_writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(true)
        .with_writer(make_writer)
        .compact()
        .finish()
}

/// Run `f` (typically settings loading) with [`bootstrap_subscriber`] on stderr,
/// so warnings about rejected configuration values reach the operator.
pub fn with_bootstrap_logging<T>(f: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(bootstrap_subscriber(std::io::stderr), f)
}
