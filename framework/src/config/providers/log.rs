use crate::config::env::env;

/// Logging configuration
///
/// `RUST_LOG`, when set, takes precedence over `LOG_LEVEL`.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive (`LOG_LEVEL`, default `info`)
    pub level: String,
    /// Colored output (`LOG_ANSI`, default `true`)
    pub ansi: bool,
    /// Include the event target (`LOG_TARGET`, default `false`)
    pub target: bool,
}

impl LogConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        Self {
            level: env("LOG_LEVEL", "info".to_string()),
            ansi: env("LOG_ANSI", true),
            target: env("LOG_TARGET", false),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
