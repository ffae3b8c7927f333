//! # Courier Chats Crate
//!
//! Chat operations of the Courier back-end: creating and deleting chats and
//! sending messages, each executed as one unit of work together with its
//! audit entry.
//!
//! ## Architecture
//!
//! - **Entities**: Domain models (Chat, Participant, Message, AuditEntry)
//! - **Repositories**: `ChatStore` and `AuditLog` capabilities with SQL implementations
//! - **Services**: `ChatService`, which orchestrates the repositories inside units of work
//! - **Types**: Errors and result aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use courier_chats::ChatService;
//! use courier_database::TransactionCoordinator;
//!
//! # async fn run(connection: courier_database::DatabaseConnection) -> courier_chats::ChatResult<()> {
//! let service = ChatService::with_sql(TransactionCoordinator::new(&connection));
//! let chat_id = service.create_chat(1, "general", &[1, 2]).await?;
//! service.delete_chat(1, chat_id).await?;
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod repositories;
pub mod services;
pub mod types;

pub use entities::{AuditAction, AuditEntry, Chat, Message, NewAuditEntry, NewMessage, Participant};
pub use repositories::{
    load_snapshot, AuditLog, ChatSnapshot, ChatStore, SqlAuditLog, SqlChatStore,
};
pub use services::ChatService;
pub use types::{ChatError, ChatResult, Step, StepError, StoreError, StoreResult};
