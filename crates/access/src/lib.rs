//! Clients for the collaborators that decide who may call the chat
//! operations and who a username belongs to.
//!
//! Both collaborators are reached over HTTP by [`HttpAccessClient`]; callers
//! depend on the [`AccessChecker`] and [`UserDirectory`] capabilities only.

use async_trait::async_trait;
use thiserror::Error;

mod client;
#[cfg(feature = "testing")]
pub mod testing;

pub use client::{HttpAccessClient, CHECK_PATH, RESOLVE_USERNAMES_PATH};

pub type AccessResult<T> = Result<T, AccessError>;

/// Verdict of the authorization service for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The credential may invoke the operation; `user_id` is its owner.
    Allowed { user_id: i64 },
    Denied { reason: String },
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("access service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from {endpoint}: {detail}")]
    Protocol {
        endpoint: &'static str,
        detail: String,
    },

    #[error("unknown user: {0}")]
    UnknownUser(String),
}

/// Asks the authorization service whether a credential may invoke an operation.
#[async_trait]
pub trait AccessChecker: Send + Sync {
    /// `operation` is the fully-qualified operation name, e.g. `/chat_v1.Chat/Create`.
    async fn check(&self, credential: &str, operation: &str) -> AccessResult<AccessDecision>;
}

/// Maps usernames to numeric user ids.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Ids in the same order as `usernames`. Any unknown name fails the whole lookup.
    async fn resolve_usernames(&self, usernames: &[String]) -> AccessResult<Vec<i64>>;
}
