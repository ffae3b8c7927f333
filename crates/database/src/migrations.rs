//! Database migrations

use anyhow::Context;
use sqlx::migrate::Migrator;
use tracing::info;

use crate::connection::{DatabaseConnection, DatabaseKind};

pub static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");
pub static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");

/// Embedded migrations for the given backend.
pub fn migrator(kind: DatabaseKind) -> &'static Migrator {
    match kind {
        DatabaseKind::Postgres => &POSTGRES_MIGRATOR,
        DatabaseKind::Sqlite => &SQLITE_MIGRATOR,
    }
}

/// Run database migrations
pub async fn run_migrations(connection: &DatabaseConnection) -> anyhow::Result<()> {
    migrator(connection.kind())
        .run(connection.pool())
        .await
        .context("database migrations failed")?;
    info!(backend = connection.kind().as_str(), "database migrations applied");
    Ok(())
}
