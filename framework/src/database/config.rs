//! Database configuration

use crate::config::env::env;

/// Database backend, detected from the URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Postgres,
    MySql,
    Sqlite,
}

impl DatabaseType {
    /// Detect the backend from a connection URL
    ///
    /// ```rust
    /// use lattice::DatabaseType;
    ///
    /// assert_eq!(DatabaseType::from_url("postgres://localhost/app"), Some(DatabaseType::Postgres));
    /// assert_eq!(DatabaseType::from_url("redis://localhost"), None);
    /// ```
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL (`DATABASE_URL`)
    pub url: String,
    /// Maximum pool size (`DB_MAX_CONNECTIONS`, default 10)
    pub max_connections: u32,
    /// Minimum pool size (`DB_MIN_CONNECTIONS`, default 1)
    pub min_connections: u32,
    /// Connect timeout in seconds (`DB_CONNECT_TIMEOUT`, default 30)
    pub connect_timeout: u64,
    /// Log SQL statements (`DB_LOGGING`, default false)
    pub logging: bool,
}

impl DatabaseConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        Self {
            url: env("DATABASE_URL", "sqlite://./database.db".to_string()),
            max_connections: env("DB_MAX_CONNECTIONS", 10),
            min_connections: env("DB_MIN_CONNECTIONS", 1),
            connect_timeout: env("DB_CONNECT_TIMEOUT", 30),
            logging: env("DB_LOGGING", false),
        }
    }

    /// Create a builder for customizing config
    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::default()
    }

    /// Backend of the configured URL
    pub fn database_type(&self) -> Option<DatabaseType> {
        DatabaseType::from_url(&self.url)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Builder for DatabaseConfig
#[derive(Default)]
pub struct DatabaseConfigBuilder {
    url: Option<String>,
    max_connections: Option<u32>,
    min_connections: Option<u32>,
    connect_timeout: Option<u64>,
    logging: Option<bool>,
}

impl DatabaseConfigBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = Some(n);
        self
    }

    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = Some(n);
        self
    }

    pub fn connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout = Some(seconds);
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = Some(enabled);
        self
    }

    /// Build the DatabaseConfig
    pub fn build(self) -> DatabaseConfig {
        let default = DatabaseConfig::from_env();
        DatabaseConfig {
            url: self.url.unwrap_or(default.url),
            max_connections: self.max_connections.unwrap_or(default.max_connections),
            min_connections: self.min_connections.unwrap_or(default.min_connections),
            connect_timeout: self.connect_timeout.unwrap_or(default.connect_timeout),
            logging: self.logging.unwrap_or(default.logging),
        }
    }
}
