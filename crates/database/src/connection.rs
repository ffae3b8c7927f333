//! Database connection management

use anyhow::{Context, Result};
use courier_config::DatabaseConfig;
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::types::{DatabaseError, DatabaseResult};

/// Backend selected by the database URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Postgres,
    Sqlite,
}

impl DatabaseKind {
    pub fn from_url(url: &str) -> DatabaseResult<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            // only the scheme, the rest of the url may carry credentials
            let scheme = url.split_once(':').map_or(url, |(scheme, _)| scheme);
            Err(DatabaseError::UnsupportedScheme(scheme.to_string()))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Prepare and establish a database connection
///
/// Connection is retried up to `connect_attempts` times, waiting
/// `connect_attempt_delay_ms` between attempts.
pub async fn prepare_database(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    install_default_drivers();

    let kind = DatabaseKind::from_url(&config.url)?;
    if kind == DatabaseKind::Sqlite {
        ensure_sqlite_path(&config.url).await?;
    }

    let attempts = config.connect_attempts.max(1);
    let mut attempt = 1;
    let pool = loop {
        match pool_options(config, kind).connect(&config.url).await {
            Ok(pool) => break pool,
            Err(err) if attempt < attempts => {
                warn!(
                    backend = kind.as_str(),
                    attempt,
                    attempts,
                    error = %err,
                    "database connection attempt failed, retrying"
                );
                attempt += 1;
                tokio::time::sleep(config.connect_attempt_delay()).await;
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!(
                        "failed to connect to {} database after {attempts} attempt(s)",
                        kind.as_str()
                    )
                });
            }
        }
    };

    info!(backend = kind.as_str(), attempt, "database connection established");
    Ok(DatabaseConnection { pool, kind })
}

fn pool_options(config: &DatabaseConfig, kind: DatabaseKind) -> AnyPoolOptions {
    let options = AnyPoolOptions::new().max_connections(config.max_connections.max(1));

    match kind {
        DatabaseKind::Postgres => options,
        DatabaseKind::Sqlite => options.after_connect(|conn, _meta| {
            Box::pin(async move {
                // Set busy timeout to prevent database locked errors
                sqlx::query("PRAGMA busy_timeout = 5000")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA journal_mode = WAL")
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        }),
    }
}

/// Ensure the SQLite database file and directory exist
async fn ensure_sqlite_path(url: &str) -> Result<()> {
    let Some(rest) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };

    let sqlite_path = rest.split_once('?').map_or(rest, |(path, _)| path);
    if sqlite_path.is_empty() || sqlite_path == ":memory:" {
        return Ok(());
    }

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create sqlite directory {}", parent.display())
            })?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .await
            .with_context(|| format!("failed to create sqlite database file {}", path.display()))?;
    }

    Ok(())
}

/// Database connection wrapper for easier management
#[derive(Clone)]
pub struct DatabaseConnection {
    pool: AnyPool,
    kind: DatabaseKind,
}

impl DatabaseConnection {
    /// Create a new database connection from configuration
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        prepare_database(config).await
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn kind(&self) -> DatabaseKind {
        self.kind
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Test the database connection
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("failed to test database connection")?;
        Ok(())
    }
}
