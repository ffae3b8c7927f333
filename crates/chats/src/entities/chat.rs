use serde::{Deserialize, Serialize};

/// A chat conversation. Created together with its participants and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Database primary key, generated on insert
    pub id: i64,
    /// Chat title
    pub title: String,
}

/// Membership of a user in a chat. Has no identity of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub chat_id: i64,
    pub user_id: i64,
}
