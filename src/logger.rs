//! Logging setup for the slamkit binaries
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to executables, which call [`init_logger`] once at startup.

use tracing::Level;

/// Install the standard subscriber with INFO as the default level.
///
/// `RUST_LOG` overrides the default, e.g. `RUST_LOG=slamkit=debug`.
///
/// # Example
/// ```no_run
/// use slamkit::init_logger;
///
/// init_logger();
/// tracing::info!("Application started");
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Install the standard subscriber with a custom default level.
///
/// Output lines carry a timestamp, the level and the event target. Calling
/// this twice panics, as `tracing_subscriber` allows a single global
/// subscriber.
pub fn init_logger_with_level(default_level: Level) {
    use tracing_subscriber::fmt::time::SystemTime;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_timer(SystemTime)
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
