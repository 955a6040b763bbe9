//! Logging setup.
//!
//! The crate only emits `tracing` events. Hosts that already install a
//! subscriber can ignore this module; small tools call [`init`] once.

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a formatted stderr subscriber.
///
/// `RUST_LOG` takes precedence over `log_level` ("trace", "debug", "info",
/// "warn", "error"; anything else means "info"). Fails if a global
/// subscriber is already set.
pub fn init(log_level: &str) -> anyhow::Result<()> {
    let level = parse_level(log_level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize logging")
}

fn parse_level(log_level: &str) -> Level {
    match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
