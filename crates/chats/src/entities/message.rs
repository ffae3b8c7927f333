use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    /// Sender
    pub user_id: i64,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// A message about to be appended to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub chat_id: i64,
    pub sender: i64,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl NewMessage {
    pub fn new(chat_id: i64, sender: i64, text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            chat_id,
            sender,
            text: text.into(),
            sent_at,
        }
    }
}

