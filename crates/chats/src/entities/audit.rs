use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mutating action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditAction {
    ChatCreated,
    ChatDeleted,
    MessageSent,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::ChatCreated => "chat-created",
            AuditAction::ChatDeleted => "chat-deleted",
            AuditAction::MessageSent => "message-sent",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown audit action `{0}`")]
pub struct UnknownAuditAction(pub String);

impl FromStr for AuditAction {
    type Err = UnknownAuditAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat-created" => Ok(AuditAction::ChatCreated),
            "chat-deleted" => Ok(AuditAction::ChatDeleted),
            "message-sent" => Ok(AuditAction::MessageSent),
            other => Err(UnknownAuditAction(other.to_string())),
        }
    }
}

/// Stored audit record. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub action: AuditAction,
    /// Actor
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl NewAuditEntry {
    /// Entry stamped with the current time.
    pub fn now(action: AuditAction, user_id: i64) -> Self {
        Self {
            action,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tags_parse_back() {
        for action in [
            AuditAction::ChatCreated,
            AuditAction::ChatDeleted,
            AuditAction::MessageSent,
        ] {
            assert_eq!(action.as_str().parse::<AuditAction>(), Ok(action));
        }
        assert!("create_chat".parse::<AuditAction>().is_err());
    }

    #[test]
    fn unknown_action_is_an_error_naming_the_tag() {
        let err = "create_chat".parse::<AuditAction>().unwrap_err();
        assert_eq!(err.to_string(), "unknown audit action `create_chat`");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn serde_uses_the_stored_tags() {
        let json = serde_json::to_string(&AuditAction::MessageSent).unwrap();
        assert_eq!(json, "\"message-sent\"");
    }
}
