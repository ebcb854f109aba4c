//! Structured logging initialization
//!
//! Provides consistent logging initialization across entrypoints.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Guard that keeps the tracing subscriber active.
/// Hold it until the end of main so buffered output is flushed.
pub struct LogGuard;

/// Initialize structured logging for a component.
///
/// The filter comes from `RUST_LOG`, with INFO always enabled. Output goes
/// to stderr so stdout stays free for anything the caller prints.
///
/// # Example
/// ```ignore
/// let _guard = init_logging("token-auth");
/// info!("Starting up...");
/// ```
pub fn init_logging(component: &str) -> LogGuard {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let format = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init();

    tracing::debug!(component, "Logging initialized");

    LogGuard
}
