//! Read-side view of every chat table, used by data dumps and tests.

use sqlx::any::AnyRow;
use sqlx::AnyPool;
use sqlx::Row;

use super::parse_timestamp;
use crate::entities::{AuditAction, AuditEntry, Chat, Message, Participant};
use crate::types::{StoreError, StoreResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub chats: Vec<Chat>,
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
    pub audit_log: Vec<AuditEntry>,
}

/// Load all rows, ordered by id (participants by chat, then user).
pub async fn load_snapshot(pool: &AnyPool) -> StoreResult<ChatSnapshot> {
    let chats = sqlx::query("SELECT id, title FROM chats ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(StoreError::on("select chats"))?
        .iter()
        .map(chat_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::on("decode chat"))?;

    let participants =
        sqlx::query("SELECT chat_id, user_id FROM chat_participants ORDER BY chat_id, user_id")
            .fetch_all(pool)
            .await
            .map_err(StoreError::on("select participants"))?
            .iter()
            .map(participant_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::on("decode participant"))?;

    let messages =
        sqlx::query("SELECT id, chat_id, user_id, text, sent_at FROM chat_messages ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(StoreError::on("select messages"))?
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::on("decode message"))?;

    let audit_log =
        sqlx::query("SELECT id, action, user_id, created_at FROM audit_log ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(StoreError::on("select audit log"))?
            .iter()
            .map(audit_entry_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::on("decode audit entry"))?;

    Ok(ChatSnapshot {
        chats,
        participants,
        messages,
        audit_log,
    })
}

fn chat_from_row(row: &AnyRow) -> Result<Chat, sqlx::Error> {
    Ok(Chat {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
    })
}

fn participant_from_row(row: &AnyRow) -> Result<Participant, sqlx::Error> {
    Ok(Participant {
        chat_id: row.try_get("chat_id")?,
        user_id: row.try_get("user_id")?,
    })
}

fn message_from_row(row: &AnyRow) -> Result<Message, sqlx::Error> {
    let sent_at: String = row.try_get("sent_at")?;
    Ok(Message {
        id: row.try_get("id")?,
        chat_id: row.try_get("chat_id")?,
        user_id: row.try_get("user_id")?,
        text: row.try_get("text")?,
        sent_at: parse_timestamp("sent_at", &sent_at)?,
    })
}

fn audit_entry_from_row(row: &AnyRow) -> Result<AuditEntry, sqlx::Error> {
    let action: String = row.try_get("action")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(AuditEntry {
        id: row.try_get("id")?,
        action: action
            .parse::<AuditAction>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "action".to_string(),
                source: Box::new(e),
            })?,
        user_id: row.try_get("user_id")?,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}
