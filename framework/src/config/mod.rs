//! Configuration module for the Lattice framework
//!
//! - Layered `.env` loading keyed by `APP_ENV`
//! - Typed configuration structs built from environment variables
//! - A typed repository to register and fetch them
//!
//! # Example
//!
//! ```rust,no_run
//! use lattice::{Config, ServerConfig};
//!
//! Config::init(std::path::Path::new("."));
//! let server = Config::get::<ServerConfig>().unwrap();
//! println!("Server port: {}", server.port);
//! ```

pub mod env;
pub mod providers;

pub use env::{env, env_list, env_optional, env_required, load_dotenv, Environment};
pub use providers::{
    AppConfig, AppConfigBuilder, AuthConfig, LogConfig, ServerConfig, ServerConfigBuilder,
};

use crate::container::Container;
use std::any::Any;
use std::path::Path;
use std::sync::{OnceLock, RwLock};

/// Typed config store; each config struct is a singleton keyed by its type
static CONFIG_REPOSITORY: OnceLock<RwLock<Container>> = OnceLock::new();

fn repository() -> &'static RwLock<Container> {
    CONFIG_REPOSITORY.get_or_init(|| RwLock::new(Container::new()))
}

/// Main Config facade for accessing configuration
pub struct Config;

impl Config {
    /// Initialize the configuration system
    ///
    /// Loads `.env` files from `project_root` and registers the framework
    /// configs (`AppConfig`, `ServerConfig`, `AuthConfig`, `LogConfig`).
    /// Returns the detected environment.
    pub fn init(project_root: &Path) -> Environment {
        let (env, loaded) = env::load_dotenv(project_root);
        for path in &loaded {
            tracing::debug!(path = %path.display(), "loaded env file");
        }

        Self::register(AppConfig::from_env());
        Self::register(ServerConfig::from_env());
        Self::register(AuthConfig::from_env());
        Self::register(LogConfig::from_env());

        env
    }

    /// Get a typed config struct from the repository
    pub fn get<T: Any + Send + Sync + Clone + 'static>() -> Option<T> {
        let repo = CONFIG_REPOSITORY.get()?;
        repo.read().ok()?.instance::<T>()
    }

    /// Register a config struct, replacing any previous one of the same type
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use lattice::Config;
    ///
    /// #[derive(Clone)]
    /// struct MailConfig {
    ///     host: String,
    /// }
    ///
    /// Config::register(MailConfig { host: "localhost".to_string() });
    /// ```
    pub fn register<T: Any + Send + Sync + 'static>(config: T) {
        if let Ok(mut repo) = repository().write() {
            repo.singleton(config);
        }
    }

    /// Check if a config type is registered
    pub fn has<T: Any + 'static>() -> bool {
        CONFIG_REPOSITORY
            .get()
            .and_then(|repo| repo.read().ok())
            .map(|repo| repo.has::<T>())
            .unwrap_or(false)
    }

    /// Get the current environment
    pub fn environment() -> Environment {
        Config::get::<AppConfig>()
            .map(|c| c.environment)
            .unwrap_or_else(Environment::detect)
    }

    /// Check if running in production environment
    pub fn is_production() -> bool {
        Self::environment().is_production()
    }

    /// Check if debug mode is enabled
    pub fn is_debug() -> bool {
        Config::get::<AppConfig>().map(|c| c.debug).unwrap_or(true)
    }
}
