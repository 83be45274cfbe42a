use crate::config::env::{env, env_list};

/// Bearer authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Accepted bearer tokens (`AUTH_TOKENS`, comma separated)
    pub tokens: Vec<String>,
    /// Realm reported in `WWW-Authenticate`
    pub realm: String,
}

impl AuthConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        Self {
            tokens: env_list("AUTH_TOKENS"),
            realm: env("AUTH_REALM", "api".to_string()),
        }
    }

    /// Whether any token is configured
    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }
}
