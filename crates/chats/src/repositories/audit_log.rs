//! Append-only audit log.

use async_trait::async_trait;
use courier_database::UnitOfWork;

use super::format_timestamp;
use crate::entities::NewAuditEntry;
use crate::types::{StoreError, StoreResult};

/// Records one entry per mutating action, inside the unit of work of that action.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append an entry and return its id.
    async fn append(&self, unit: &mut UnitOfWork, entry: &NewAuditEntry) -> StoreResult<i64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlAuditLog;

impl SqlAuditLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLog for SqlAuditLog {
    async fn append(&self, unit: &mut UnitOfWork, entry: &NewAuditEntry) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO audit_log (action, user_id, created_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(entry.action.as_str())
        .bind(entry.user_id)
        .bind(format_timestamp(&entry.created_at))
        .fetch_one(unit.connection())
        .await
        .map_err(StoreError::on("append audit entry"))
    }
}
