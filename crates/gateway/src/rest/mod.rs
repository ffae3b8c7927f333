//! REST API endpoints for the gateway

pub mod chat;
pub mod health;

pub use chat::{
    create_chat_routes, CreateChatRequest, CreateChatResponse, DeleteChatRequest, Empty, Invitee,
    SendMessageRequest, CREATE_CHAT_PATH, DELETE_CHAT_PATH, SEND_MESSAGE_PATH,
};
pub use health::{create_health_routes, HealthResponse};
