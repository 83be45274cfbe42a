//! Environment detection, `.env` loading and typed variable lookup

use crate::error::FrameworkError;
use std::path::{Path, PathBuf};

/// Environment type enumeration
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Local,
    Development,
    Staging,
    Production,
    Testing,
    Custom(String),
}

impl Environment {
    /// Detect environment from APP_ENV or default to Local
    pub fn detect() -> Self {
        Self::parse(std::env::var("APP_ENV").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            Some("staging") => Self::Staging,
            Some("development") => Self::Development,
            Some("testing") => Self::Testing,
            Some("local") | None => Self::Local,
            Some(other) => Self::Custom(other.to_string()),
        }
    }

    /// Suffix used by the environment-specific `.env.{suffix}` file
    pub fn env_file_suffix(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment (local or development)
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Local | Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_file_suffix())
    }
}

/// `.env` files for an environment, most specific first
///
/// dotenvy never overwrites a variable that is already set, so loading in
/// this order gives: system env > `.env.{env}.local` > `.env.{env}` >
/// `.env.local` > `.env`.
pub fn dotenv_files(project_root: &Path, env: &Environment) -> Vec<PathBuf> {
    let suffix = env.env_file_suffix();
    vec![
        project_root.join(format!(".env.{}.local", suffix)),
        project_root.join(format!(".env.{}", suffix)),
        project_root.join(".env.local"),
        project_root.join(".env"),
    ]
}

/// Load environment variables from `.env` files with proper precedence
///
/// Returns the detected environment and the files that were loaded.
pub fn load_dotenv(project_root: &Path) -> (Environment, Vec<PathBuf>) {
    let env = Environment::detect();
    let loaded = dotenv_files(project_root, &env)
        .into_iter()
        .filter(|path| dotenvy::from_path(path).is_ok())
        .collect();
    (env, loaded)
}

/// Get an environment variable with a default value
///
/// # Example
/// ```
/// use lattice::config::env;
///
/// let port: u16 = env("SERVER_PORT", 8080);
/// ```
pub fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_optional(key).unwrap_or(default)
}

/// Get an optional environment variable
pub fn env_optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Get a required environment variable
///
/// # Example
/// ```no_run
/// use lattice::config::env_required;
///
/// let url: String = env_required("DATABASE_URL").unwrap();
/// ```
pub fn env_required<T: std::str::FromStr>(key: &str) -> Result<T, FrameworkError> {
    let raw = std::env::var(key)
        .map_err(|_| FrameworkError::config(format!("{} is not set", key)))?;
    raw.trim()
        .parse()
        .map_err(|_| FrameworkError::config(format!("{} has an invalid value", key)))
}

/// Get a comma-separated list, skipping blank items
///
/// # Example
/// ```
/// use lattice::config::env_list;
///
/// let modules = env_list("APP_MODULES");
/// ```
pub fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|raw| split_list(&raw))
        .unwrap_or_default()
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
