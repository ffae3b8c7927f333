//! Chat operation endpoints
//!
//! One POST route per operation; the route path is the operation's
//! fully-qualified name, which is also what the access check is asked about.

use std::sync::Arc;

use axum::{extract::State, routing::post, Extension, Json, Router};
use chrono::{DateTime, Utc};
use courier_access::AccessError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::middleware::Caller;
use crate::state::GatewayState;

pub const CREATE_CHAT_PATH: &str = "/chat_v1.Chat/Create";
pub const DELETE_CHAT_PATH: &str = "/chat_v1.Chat/Delete";
pub const SEND_MESSAGE_PATH: &str = "/chat_v1.Chat/SendMessage";

/// An invitee given either by numeric id or by username.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Invitee {
    Id(i64),
    Name(String),
}

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub title: String,
    #[serde(default)]
    pub usernames: Vec<Invitee>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateChatResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteChatRequest {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub from: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of operations that return nothing; serializes as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

/// Create chat routes
pub fn create_chat_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route(CREATE_CHAT_PATH, post(create_chat))
        .route(DELETE_CHAT_PATH, post(delete_chat))
        .route(SEND_MESSAGE_PATH, post(send_message))
}

pub async fn create_chat(
    State(state): State<Arc<GatewayState>>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateChatRequest>,
) -> GatewayResult<Json<CreateChatResponse>> {
    let invitees = resolve_invitees(&state, payload.usernames).await?;

    let id = state
        .chat_service()
        .create_chat(caller.user_id, &payload.title, &invitees)
        .await
        .map_err(|_| GatewayError::OperationFailed("failed to create chat"))?;

    Ok(Json(CreateChatResponse { id }))
}

pub async fn delete_chat(
    State(state): State<Arc<GatewayState>>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<DeleteChatRequest>,
) -> GatewayResult<Json<Empty>> {
    state
        .chat_service()
        .delete_chat(caller.user_id, payload.id)
        .await
        .map_err(|_| GatewayError::OperationFailed("failed to delete chat"))?;

    Ok(Json(Empty {}))
}

pub async fn send_message(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<SendMessageRequest>,
) -> GatewayResult<Json<Empty>> {
    state
        .chat_service()
        .send_message(payload.chat_id, payload.from, &payload.text, payload.timestamp)
        .await
        .map_err(|_| GatewayError::OperationFailed("failed to send message"))?;

    Ok(Json(Empty {}))
}

/// Turn invitees into user ids, keeping their order.
///
/// All usernames are resolved in one directory call; numeric ids pass through.
async fn resolve_invitees(state: &GatewayState, invitees: Vec<Invitee>) -> GatewayResult<Vec<i64>> {
    let names: Vec<String> = invitees
        .iter()
        .filter_map(|invitee| match invitee {
            Invitee::Name(name) => Some(name.clone()),
            Invitee::Id(_) => None,
        })
        .collect();

    if names.is_empty() {
        return Ok(invitees
            .into_iter()
            .filter_map(|invitee| match invitee {
                Invitee::Id(id) => Some(id),
                Invitee::Name(_) => None,
            })
            .collect());
    }

    let resolved = state
        .user_directory()
        .resolve_usernames(&names)
        .await
        .map_err(|err| match err {
            AccessError::UnknownUser(name) => {
                warn!(username = %name, "unknown invitee");
                GatewayError::UnknownUser(name)
            }
            other => {
                error!(error = %other, "username resolution failed");
                GatewayError::DirectoryUnavailable
            }
        })?;

    let mut resolved = resolved.into_iter();
    let mut ids = Vec::with_capacity(invitees.len());
    for invitee in invitees {
        match invitee {
            Invitee::Id(id) => ids.push(id),
            Invitee::Name(name) => match resolved.next() {
                Some(id) => ids.push(id),
                None => {
                    error!(username = %name, "user directory returned too few ids");
                    return Err(GatewayError::DirectoryUnavailable);
                }
            },
        }
    }
    Ok(ids)
}
