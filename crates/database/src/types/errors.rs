//! Error types for the database layer

use std::fmt;

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Unsupported database url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Failures of the transaction boundary itself, as opposed to the work inside it.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("failed to begin transaction")]
    Begin(#[source] sqlx::Error),

    #[error("failed to set transaction isolation level")]
    Isolation(#[source] sqlx::Error),

    #[error("failed to commit transaction")]
    Commit(#[source] sqlx::Error),
}

/// Outcome of a unit of work that did not commit.
#[derive(Debug)]
pub enum UnitError<E> {
    /// The unit could not be opened or committed.
    Transaction {
        op: &'static str,
        source: TransactionError,
    },
    /// The enclosed work failed and the unit was rolled back.
    ///
    /// `rollback` holds the rollback failure, if any. It never replaces `source`.
    Work {
        op: &'static str,
        source: E,
        rollback: Option<sqlx::Error>,
    },
}

impl<E> UnitError<E> {
    pub fn op(&self) -> &'static str {
        match self {
            Self::Transaction { op, .. } | Self::Work { op, .. } => op,
        }
    }
}

impl<E: fmt::Display> fmt::Display for UnitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction { op, source } => write!(f, "{op}: {source}"),
            Self::Work {
                op,
                source,
                rollback: None,
            } => write!(f, "{op}: {source}"),
            Self::Work {
                op,
                source,
                rollback: Some(rollback),
            } => write!(f, "{op}: {source} (rollback failed: {rollback})"),
        }
    }
}

impl<E> std::error::Error for UnitError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transaction { source, .. } => Some(source),
            Self::Work { source, .. } => Some(source),
        }
    }
}
