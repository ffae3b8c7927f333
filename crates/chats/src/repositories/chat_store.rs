//! Chat, participant and message tables.

use async_trait::async_trait;
use courier_database::UnitOfWork;

use super::format_timestamp;
use crate::entities::NewMessage;
use crate::types::{StoreError, StoreResult};

/// Single-statement writes on the chat tables.
///
/// Every call runs on the connection of the given unit of work. The store does
/// no cross-entity reasoning; ordering is the caller's job.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Insert a chat row and return its generated id.
    async fn insert_chat(&self, unit: &mut UnitOfWork, title: &str) -> StoreResult<i64>;

    async fn insert_participant(
        &self,
        unit: &mut UnitOfWork,
        chat_id: i64,
        user_id: i64,
    ) -> StoreResult<()>;

    /// Returns the number of rows removed.
    async fn delete_participants(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64>;

    /// Returns the number of rows removed.
    async fn delete_messages(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64>;

    /// Returns the number of rows removed.
    async fn delete_chat(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64>;

    /// Insert a message row and return its generated id.
    async fn insert_message(&self, unit: &mut UnitOfWork, message: &NewMessage)
        -> StoreResult<i64>;
}

/// SQL implementation shared by PostgreSQL and SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlChatStore;

impl SqlChatStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatStore for SqlChatStore {
    async fn insert_chat(&self, unit: &mut UnitOfWork, title: &str) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("INSERT INTO chats (title) VALUES ($1) RETURNING id")
            .bind(title)
            .fetch_one(unit.connection())
            .await
            .map_err(StoreError::on("insert chat"))
    }

    async fn insert_participant(
        &self,
        unit: &mut UnitOfWork,
        chat_id: i64,
        user_id: i64,
    ) -> StoreResult<()> {
        sqlx::query("INSERT INTO chat_participants (chat_id, user_id) VALUES ($1, $2)")
            .bind(chat_id)
            .bind(user_id)
            .execute(unit.connection())
            .await
            .map_err(StoreError::on("insert participant"))?;
        Ok(())
    }

    async fn delete_participants(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM chat_participants WHERE chat_id = $1")
            .bind(chat_id)
            .execute(unit.connection())
            .await
            .map_err(StoreError::on("delete participants"))?;
        Ok(result.rows_affected())
    }

    async fn delete_messages(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE chat_id = $1")
            .bind(chat_id)
            .execute(unit.connection())
            .await
            .map_err(StoreError::on("delete messages"))?;
        Ok(result.rows_affected())
    }

    async fn delete_chat(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1")
            .bind(chat_id)
            .execute(unit.connection())
            .await
            .map_err(StoreError::on("delete chat"))?;
        Ok(result.rows_affected())
    }

    async fn insert_message(
        &self,
        unit: &mut UnitOfWork,
        message: &NewMessage,
    ) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO chat_messages (chat_id, user_id, text, sent_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(message.chat_id)
        .bind(message.sender)
        .bind(message.text.as_str())
        .bind(format_timestamp(&message.sent_at))
        .fetch_one(unit.connection())
        .await
        .map_err(StoreError::on("insert message"))
    }
}
