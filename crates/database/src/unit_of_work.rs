//! Transaction coordination for multi-statement writes.
//!
//! Every mutating operation runs inside exactly one [`UnitOfWork`], opened by
//! [`TransactionCoordinator::run_unit`] at read-committed isolation. The unit
//! is handed to the enclosed work by value and handed back together with the
//! work's outcome; the coordinator then commits on `Ok` and rolls back on
//! `Err`. Dropping an unfinished unit (for example when a request deadline
//! cancels the surrounding future) rolls it back.

use std::fmt;
use std::future::Future;

use sqlx::{Any, AnyConnection, AnyPool, Transaction};
use tracing::{debug, error};

use crate::connection::{DatabaseConnection, DatabaseKind};
use crate::types::{TransactionError, UnitError};

/// Isolation applied to every unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadCommitted,
}

impl IsolationLevel {
    /// Statement establishing this level right after `BEGIN`.
    ///
    /// SQLite transactions are always serializable, which is stronger than
    /// read committed, so nothing is issued there.
    fn statement(self, kind: DatabaseKind) -> Option<&'static str> {
        match (self, kind) {
            (Self::ReadCommitted, DatabaseKind::Postgres) => {
                Some("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            }
            (Self::ReadCommitted, DatabaseKind::Sqlite) => None,
        }
    }
}

/// An open transaction. Only the coordinator creates one.
pub struct UnitOfWork {
    tx: Transaction<'static, Any>,
}

impl UnitOfWork {
    /// Connection every statement of the unit must run on.
    pub fn connection(&mut self) -> &mut AnyConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), TransactionError> {
        self.tx.commit().await.map_err(TransactionError::Commit)
    }

    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct TransactionCoordinator {
    pool: AnyPool,
    kind: DatabaseKind,
    isolation: IsolationLevel,
}

impl TransactionCoordinator {
    pub fn new(connection: &DatabaseConnection) -> Self {
        Self {
            pool: connection.pool().clone(),
            kind: connection.kind(),
            isolation: IsolationLevel::ReadCommitted,
        }
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    /// Open a unit of work at the coordinator's isolation level.
    pub async fn begin(&self) -> Result<UnitOfWork, TransactionError> {
        let mut tx = self.pool.begin().await.map_err(TransactionError::Begin)?;

        if let Some(statement) = self.isolation.statement(self.kind) {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(TransactionError::Isolation)?;
        }

        Ok(UnitOfWork { tx })
    }

    /// Run `work` inside one unit of work named `op`.
    ///
    /// `work` never runs when the unit cannot be opened. A failed rollback is
    /// logged and reported next to the work error, never instead of it.
    pub async fn run_unit<T, E, F, Fut>(&self, op: &'static str, work: F) -> Result<T, UnitError<E>>
    where
        F: FnOnce(UnitOfWork) -> Fut,
        Fut: Future<Output = (UnitOfWork, Result<T, E>)>,
        E: fmt::Display,
    {
        let unit = self
            .begin()
            .await
            .map_err(|source| UnitError::Transaction { op, source })?;

        let (unit, outcome) = work(unit).await;

        match outcome {
            Ok(value) => {
                unit.commit()
                    .await
                    .map_err(|source| UnitError::Transaction { op, source })?;
                debug!(op, "unit of work committed");
                Ok(value)
            }
            Err(source) => {
                let rollback = match unit.rollback().await {
                    Ok(()) => None,
                    Err(err) => {
                        error!(op, error = %err, work_error = %source, "failed to roll back unit of work");
                        Some(err)
                    }
                };
                debug!(op, error = %source, "unit of work rolled back");
                Err(UnitError::Work {
                    op,
                    source,
                    rollback,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_committed_is_only_issued_on_postgres() {
        let level = IsolationLevel::ReadCommitted;
        assert_eq!(
            level.statement(DatabaseKind::Postgres),
            Some("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
        );
        assert_eq!(level.statement(DatabaseKind::Sqlite), None);
    }
}
