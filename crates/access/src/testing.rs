//! In-process substitutes for the access collaborators.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::{AccessChecker, AccessDecision, AccessError, AccessResult, UserDirectory};

/// One recorded call to [`AccessChecker::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCall {
    pub credential: String,
    pub operation: String,
}

enum Verdict {
    Allow(i64),
    Deny(String),
    Unavailable,
}

/// Access checker with a fixed verdict that records every call it receives.
pub struct RecordingAccessChecker {
    verdict: Verdict,
    calls: Mutex<Vec<CheckCall>>,
}

impl RecordingAccessChecker {
    fn with(verdict: Verdict) -> Self {
        Self {
            verdict,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Approves every call as `user_id`.
    pub fn allowing(user_id: i64) -> Self {
        Self::with(Verdict::Allow(user_id))
    }

    pub fn denying(reason: impl Into<String>) -> Self {
        Self::with(Verdict::Deny(reason.into()))
    }

    /// Fails every call as if the service could not be reached.
    pub fn unavailable() -> Self {
        Self::with(Verdict::Unavailable)
    }

    pub fn calls(&self) -> Vec<CheckCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AccessChecker for RecordingAccessChecker {
    async fn check(&self, credential: &str, operation: &str) -> AccessResult<AccessDecision> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CheckCall {
                credential: credential.to_string(),
                operation: operation.to_string(),
            });

        match &self.verdict {
            Verdict::Allow(user_id) => Ok(AccessDecision::Allowed { user_id: *user_id }),
            Verdict::Deny(reason) => Ok(AccessDecision::Denied {
                reason: reason.clone(),
            }),
            Verdict::Unavailable => Err(AccessError::Protocol {
                endpoint: crate::CHECK_PATH,
                detail: "service unavailable".to_string(),
            }),
        }
    }
}

/// User directory backed by a fixed name to id table.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: HashMap<String, i64>,
}

impl StaticDirectory {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(name, id)| (name.into(), id))
                .collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn resolve_usernames(&self, usernames: &[String]) -> AccessResult<Vec<i64>> {
        usernames
            .iter()
            .map(|name| {
                self.users
                    .get(name)
                    .copied()
                    .ok_or_else(|| AccessError::UnknownUser(name.clone()))
            })
            .collect()
    }
}
