//! Shared fixtures for chat service tests.

#![allow(dead_code)]

use std::error::Error;

use async_trait::async_trait;
use courier_chats::{
    load_snapshot, AuditLog, ChatService, ChatSnapshot, ChatStore, NewAuditEntry, NewMessage,
    SqlAuditLog, SqlChatStore, Step, StoreError, StoreResult,
};
use courier_config::DatabaseConfig;
use courier_database::{initialize_database, DatabaseConnection, TransactionCoordinator, UnitOfWork};
use tempfile::TempDir;

pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

pub struct TestContext {
    _temp_dir: TempDir,
    pub connection: DatabaseConnection,
}

impl TestContext {
    pub async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("chats.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
            ..DatabaseConfig::default()
        };

        let connection = initialize_database(&config).await?;
        Ok(Self {
            _temp_dir: temp_dir,
            connection,
        })
    }

    pub fn coordinator(&self) -> TransactionCoordinator {
        TransactionCoordinator::new(&self.connection)
    }

    pub fn service(&self) -> ChatService {
        ChatService::with_sql(self.coordinator())
    }

    pub fn service_with<S: ChatStore, A: AuditLog>(&self, store: S, audit: A) -> ChatService<S, A> {
        ChatService::new(self.coordinator(), store, audit)
    }

    pub async fn snapshot(&self) -> TestResult<ChatSnapshot> {
        Ok(load_snapshot(self.connection.pool()).await?)
    }
}

fn injected(statement: &'static str) -> StoreError {
    StoreError {
        statement,
        source: sqlx::Error::Protocol("injected failure".to_string()),
    }
}

/// SQL chat store that fails the given step instead of running it.
pub struct FailingChatStore {
    inner: SqlChatStore,
    fail_on: Step,
}

impl FailingChatStore {
    pub fn failing_on(step: Step) -> Self {
        Self {
            inner: SqlChatStore::new(),
            fail_on: step,
        }
    }

    fn check(&self, step: Step, statement: &'static str) -> StoreResult<()> {
        if self.fail_on == step {
            Err(injected(statement))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatStore for FailingChatStore {
    async fn insert_chat(&self, unit: &mut UnitOfWork, title: &str) -> StoreResult<i64> {
        self.check(Step::InsertChat, "insert chat")?;
        self.inner.insert_chat(unit, title).await
    }

    async fn insert_participant(
        &self,
        unit: &mut UnitOfWork,
        chat_id: i64,
        user_id: i64,
    ) -> StoreResult<()> {
        self.check(Step::InsertParticipants, "insert participant")?;
        self.inner.insert_participant(unit, chat_id, user_id).await
    }

    async fn delete_participants(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64> {
        self.check(Step::DeleteParticipants, "delete participants")?;
        self.inner.delete_participants(unit, chat_id).await
    }

    async fn delete_messages(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64> {
        self.check(Step::DeleteMessages, "delete messages")?;
        self.inner.delete_messages(unit, chat_id).await
    }

    async fn delete_chat(&self, unit: &mut UnitOfWork, chat_id: i64) -> StoreResult<u64> {
        self.check(Step::DeleteChat, "delete chat")?;
        self.inner.delete_chat(unit, chat_id).await
    }

    async fn insert_message(
        &self,
        unit: &mut UnitOfWork,
        message: &NewMessage,
    ) -> StoreResult<i64> {
        self.check(Step::InsertMessage, "insert message")?;
        self.inner.insert_message(unit, message).await
    }
}

/// Audit log whose every append fails.
#[derive(Default)]
pub struct FailingAuditLog;

#[async_trait]
impl AuditLog for FailingAuditLog {
    async fn append(&self, _unit: &mut UnitOfWork, _entry: &NewAuditEntry) -> StoreResult<i64> {
        Err(injected("append audit entry"))
    }
}

pub fn sql_audit() -> SqlAuditLog {
    SqlAuditLog::new()
}
