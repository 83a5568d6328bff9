//! Tracing subscriber setup for hosts.
//!
//! The filter comes from `CODECOP_LOG`, then `RUST_LOG`, then the level the
//! host passes in. Installing twice is harmless: the second call reports
//! `false` and leaves the first subscriber in place.

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the codecop log filter.
pub const LOG_ENV_VAR: &str = "CODECOP_LOG";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Resolve the filter directive from the environment, else `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Install a global stderr subscriber. Returns whether it was installed.
pub fn init_logging(default_level: &str, format: LogFormat) -> bool {
    let filter = env_filter(default_level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    let installed = match format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    if installed {
        tracing::debug!(?format, "logging initialized");
    }
    installed
}
