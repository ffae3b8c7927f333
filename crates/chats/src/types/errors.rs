//! Error types for the chat system.

use std::fmt;

use courier_database::{TransactionError, UnitError};
use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Result type alias for single store or audit statements
pub type StoreResult<T> = Result<T, StoreError>;

/// A single statement against the chat or audit tables failed.
#[derive(Debug, Error)]
#[error("{statement}: {source}")]
pub struct StoreError {
    pub statement: &'static str,
    #[source]
    pub source: sqlx::Error,
}

impl StoreError {
    /// Adapter for `map_err` naming the failed statement.
    pub fn on(statement: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
        move |source| StoreError { statement, source }
    }
}

/// Step of a chat operation, used to name where a unit of work failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    InsertChat,
    InsertParticipants,
    DeleteParticipants,
    DeleteMessages,
    DeleteChat,
    InsertMessage,
    AppendAudit,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::InsertChat => "insert chat",
            Step::InsertParticipants => "insert participants",
            Step::DeleteParticipants => "delete participants",
            Step::DeleteMessages => "delete messages",
            Step::DeleteChat => "delete chat",
            Step::InsertMessage => "insert message",
            Step::AppendAudit => "append audit entry",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one step inside a unit of work.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{step} failed: {source}")]
    Store { step: Step, source: StoreError },

    #[error("audit append failed: {0}")]
    Audit(StoreError),
}

impl StepError {
    pub fn store(step: Step) -> impl FnOnce(StoreError) -> StepError {
        move |source| StepError::Store { step, source }
    }
}

/// Main error type for the chat system
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{op}: {source}")]
    Transaction {
        op: &'static str,
        source: TransactionError,
    },

    #[error("{op}: {step} failed: {source}")]
    Store {
        op: &'static str,
        step: Step,
        source: StoreError,
        rollback: Option<sqlx::Error>,
    },

    #[error("{op}: audit append failed: {source}")]
    Audit {
        op: &'static str,
        source: StoreError,
        rollback: Option<sqlx::Error>,
    },
}

impl ChatError {
    pub fn op(&self) -> &'static str {
        match self {
            ChatError::Transaction { op, .. }
            | ChatError::Store { op, .. }
            | ChatError::Audit { op, .. } => op,
        }
    }

    /// Step that aborted the unit, if the work itself failed.
    pub fn failed_step(&self) -> Option<Step> {
        match self {
            ChatError::Transaction { .. } => None,
            ChatError::Store { step, .. } => Some(*step),
            ChatError::Audit { .. } => Some(Step::AppendAudit),
        }
    }

    pub fn rollback_error(&self) -> Option<&sqlx::Error> {
        match self {
            ChatError::Transaction { .. } => None,
            ChatError::Store { rollback, .. } | ChatError::Audit { rollback, .. } => {
                rollback.as_ref()
            }
        }
    }
}

impl From<UnitError<StepError>> for ChatError {
    fn from(err: UnitError<StepError>) -> Self {
        match err {
            UnitError::Transaction { op, source } => ChatError::Transaction { op, source },
            UnitError::Work {
                op,
                source: StepError::Store { step, source },
                rollback,
            } => ChatError::Store {
                op,
                step,
                source,
                rollback,
            },
            UnitError::Work {
                op,
                source: StepError::Audit(source),
                rollback,
            } => ChatError::Audit {
                op,
                source,
                rollback,
            },
        }
    }
}
