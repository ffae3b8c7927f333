//! Data access layer for the chat system.
//!
//! Writes go through the [`ChatStore`] and [`AuditLog`] capabilities and always
//! run on the connection of a caller-supplied unit of work.

pub mod audit_log;
pub mod chat_store;
pub mod snapshot;

pub use audit_log::{AuditLog, SqlAuditLog};
pub use chat_store::{ChatStore, SqlChatStore};
pub use snapshot::{load_snapshot, ChatSnapshot};

use chrono::{DateTime, SecondsFormat, Utc};

// Timestamps are stored as RFC 3339 text; the Any driver has no chrono support.
pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}
