//! Shared types and error definitions for the chat system.

pub mod errors;

pub use errors::{ChatError, ChatResult, StepError, Step, StoreError, StoreResult};

pub type ChatId = i64;
pub type UserId = i64;
