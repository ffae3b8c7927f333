//! Courier Database Crate
//!
//! Connection bootstrap for PostgreSQL and SQLite through the sqlx `Any`
//! driver, embedded migrations, and the transaction coordinator every chat
//! operation runs inside.

use courier_config::DatabaseConfig;

pub mod connection;
pub mod migrations;
pub mod types;
pub mod unit_of_work;

pub use connection::{prepare_database, DatabaseConnection, DatabaseKind};
pub use migrations::run_migrations;
pub use types::{DatabaseError, DatabaseResult, TransactionError, UnitError};
pub use unit_of_work::{IsolationLevel, TransactionCoordinator, UnitOfWork};

/// Re-export commonly used types for convenience
pub use sqlx::{AnyConnection, AnyPool};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<DatabaseConnection> {
    let connection = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&connection)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(connection)
}
