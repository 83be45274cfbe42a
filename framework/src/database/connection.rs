//! Database connection management

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::container::{FromScope, Scope};
use crate::database::config::{DatabaseConfig, DatabaseType};
use crate::error::FrameworkError;

/// Clonable handle to a SeaORM connection pool
///
/// Stored in the container as a singleton and injectable into components:
///
/// ```rust,ignore
/// #[component(OrderRepository)]
/// pub struct SqlOrders {
///     #[inject]
///     db: DbConnection,
/// }
/// ```
#[derive(Clone)]
pub struct DbConnection {
    inner: Arc<DatabaseConnection>,
}

impl DbConnection {
    /// Open a connection pool from config
    ///
    /// File-backed SQLite databases are created if missing.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, FrameworkError> {
        let url = match config.database_type() {
            Some(DatabaseType::Sqlite) => sqlite_url(&config.url)?,
            Some(_) => config.url.clone(),
            None => {
                return Err(FrameworkError::config(format!(
                    "Unsupported database URL scheme: {}",
                    config.url
                )))
            }
        };

        let mut opt = ConnectOptions::new(&url);
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .sqlx_logging(config.logging);

        let conn = Database::connect(opt).await?;
        tracing::info!(backend = ?config.database_type(), "database connected");

        Ok(Self {
            inner: Arc::new(conn),
        })
    }

    /// The underlying SeaORM connection
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }
}

fn sqlite_url(url: &str) -> Result<String, FrameworkError> {
    let Some(path) = url.strip_prefix("sqlite://") else {
        // `sqlite::memory:` and other forms pass through untouched
        return Ok(url.to_string());
    };
    let path = path.trim_start_matches("./");
    if path.starts_with(":memory:") {
        return Ok(url.to_string());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FrameworkError::database(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
    }

    Ok(format!("sqlite:{}?mode=rwc", path))
}

impl AsRef<DatabaseConnection> for DbConnection {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

impl std::ops::Deref for DbConnection {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromScope for DbConnection {
    fn from_scope(scope: &Scope) -> Result<Self, FrameworkError> {
        scope.get::<DbConnection>()
    }
}
