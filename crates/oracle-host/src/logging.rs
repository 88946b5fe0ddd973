//! Tracing subscriber setup for the command-line front end

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, or `default_level` when it is unset or invalid
#[must_use]
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber, writing to stderr
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_tracing(default_level: &str, json: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr);
    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
