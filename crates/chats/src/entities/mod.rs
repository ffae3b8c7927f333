//! Domain entities for the chat system.

pub mod audit;
pub mod chat;
pub mod message;

pub use audit::{AuditAction, AuditEntry, NewAuditEntry, UnknownAuditAction};
pub use chat::{Chat, Participant};
pub use message::{Message, NewMessage};
