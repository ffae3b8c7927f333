//! Chat service for managing chat operations.
//!
//! Each public operation runs as exactly one unit of work: its chat-store
//! writes and its audit entry commit together or not at all.

use chrono::{DateTime, Utc};
use courier_database::{TransactionCoordinator, UnitOfWork};
use tracing::{debug, error, info};

use crate::entities::{AuditAction, NewAuditEntry, NewMessage};
use crate::repositories::{AuditLog, ChatStore, SqlAuditLog, SqlChatStore};
use crate::types::{ChatError, ChatResult, Step, StepError};

const CREATE_CHAT: &str = "create_chat";
const DELETE_CHAT: &str = "delete_chat";
const SEND_MESSAGE: &str = "send_message";

/// Service for managing chat operations
pub struct ChatService<S = SqlChatStore, A = SqlAuditLog> {
    coordinator: TransactionCoordinator,
    store: S,
    audit: A,
}

impl ChatService {
    /// Service backed by the SQL store and audit log.
    pub fn with_sql(coordinator: TransactionCoordinator) -> Self {
        Self::new(coordinator, SqlChatStore::new(), SqlAuditLog::new())
    }
}

impl<S, A> ChatService<S, A>
where
    S: ChatStore,
    A: AuditLog,
{
    pub fn new(coordinator: TransactionCoordinator, store: S, audit: A) -> Self {
        Self {
            coordinator,
            store,
            audit,
        }
    }

    /// Create a chat with the given participants and return its id.
    ///
    /// An empty invitee list creates a chat without participants.
    pub async fn create_chat(&self, actor: i64, title: &str, invitees: &[i64]) -> ChatResult<i64> {
        let chat_id = self
            .coordinator
            .run_unit(CREATE_CHAT, |mut unit| async move {
                let outcome = self.create_chat_steps(&mut unit, actor, title, invitees).await;
                (unit, outcome)
            })
            .await
            .map_err(|err| report(ChatError::from(err), actor))?;

        info!(
            op = CREATE_CHAT,
            chat_id,
            user_id = actor,
            participants = invitees.len(),
            "chat created"
        );
        Ok(chat_id)
    }

    async fn create_chat_steps(
        &self,
        unit: &mut UnitOfWork,
        actor: i64,
        title: &str,
        invitees: &[i64],
    ) -> Result<i64, StepError> {
        let chat_id = self
            .store
            .insert_chat(unit, title)
            .await
            .map_err(StepError::store(Step::InsertChat))?;

        for &user_id in invitees {
            self.store
                .insert_participant(unit, chat_id, user_id)
                .await
                .map_err(StepError::store(Step::InsertParticipants))?;
        }

        self.audit
            .append(unit, &NewAuditEntry::now(AuditAction::ChatCreated, actor))
            .await
            .map_err(StepError::Audit)?;

        Ok(chat_id)
    }

    /// Delete a chat with its participants and messages.
    ///
    /// Deleting a chat that does not exist removes nothing and still records
    /// the action.
    pub async fn delete_chat(&self, actor: i64, chat_id: i64) -> ChatResult<()> {
        self.coordinator
            .run_unit(DELETE_CHAT, |mut unit| async move {
                let outcome = self.delete_chat_steps(&mut unit, actor, chat_id).await;
                (unit, outcome)
            })
            .await
            .map_err(|err| report(ChatError::from(err), actor))?;

        info!(op = DELETE_CHAT, chat_id, user_id = actor, "chat deleted");
        Ok(())
    }

    async fn delete_chat_steps(
        &self,
        unit: &mut UnitOfWork,
        actor: i64,
        chat_id: i64,
    ) -> Result<(), StepError> {
        let participants = self
            .store
            .delete_participants(unit, chat_id)
            .await
            .map_err(StepError::store(Step::DeleteParticipants))?;
        let messages = self
            .store
            .delete_messages(unit, chat_id)
            .await
            .map_err(StepError::store(Step::DeleteMessages))?;
        let chats = self
            .store
            .delete_chat(unit, chat_id)
            .await
            .map_err(StepError::store(Step::DeleteChat))?;

        debug!(
            op = DELETE_CHAT,
            chat_id, participants, messages, chats, "chat rows removed"
        );

        self.audit
            .append(unit, &NewAuditEntry::now(AuditAction::ChatDeleted, actor))
            .await
            .map_err(StepError::Audit)?;

        Ok(())
    }

    /// Append a message to a chat. The sender is the audited actor.
    ///
    /// The chat is not checked for existence.
    pub async fn send_message(
        &self,
        chat_id: i64,
        sender: i64,
        text: &str,
        sent_at: DateTime<Utc>,
    ) -> ChatResult<i64> {
        let message = NewMessage::new(chat_id, sender, text, sent_at);
        let message = &message;

        let message_id = self
            .coordinator
            .run_unit(SEND_MESSAGE, |mut unit| async move {
                let outcome = self.send_message_steps(&mut unit, message).await;
                (unit, outcome)
            })
            .await
            .map_err(|err| report(ChatError::from(err), sender))?;

        debug!(op = SEND_MESSAGE, chat_id, message_id, user_id = sender, "message stored");
        Ok(message_id)
    }

    async fn send_message_steps(
        &self,
        unit: &mut UnitOfWork,
        message: &NewMessage,
    ) -> Result<i64, StepError> {
        let message_id = self
            .store
            .insert_message(unit, message)
            .await
            .map_err(StepError::store(Step::InsertMessage))?;

        self.audit
            .append(
                unit,
                &NewAuditEntry::now(AuditAction::MessageSent, message.sender),
            )
            .await
            .map_err(StepError::Audit)?;

        Ok(message_id)
    }
}

fn report(err: ChatError, user_id: i64) -> ChatError {
    error!(
        op = err.op(),
        step = err.failed_step().map(Step::as_str),
        user_id,
        error = %err,
        "chat operation failed"
    );
    err
}
