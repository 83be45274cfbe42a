//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt layer filtered by `RUST_LOG`, falling
//! back to `LogConfig::level`.

use crate::config::LogConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` when set and valid, otherwise the configured level
pub fn filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(&config.level))
}

/// Filter for a configured level; `info` when the directive does not parse
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed (tests, or a
/// second `Application::run`).
pub fn init(config: &LogConfig) -> bool {
    tracing_subscriber::registry()
        .with(filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(config.ansi)
                .with_target(config.target),
        )
        .try_init()
        .is_ok()
}
