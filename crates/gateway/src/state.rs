//! Shared application state for the gateway

use std::sync::Arc;

use courier_access::{AccessChecker, UserDirectory};
use courier_chats::ChatService;
use courier_database::DatabaseConnection;

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection, used for health checks
    database: DatabaseConnection,
    chat_service: Arc<ChatService>,
    access_checker: Arc<dyn AccessChecker>,
    user_directory: Arc<dyn UserDirectory>,
}

impl GatewayState {
    pub fn new(
        database: DatabaseConnection,
        chat_service: Arc<ChatService>,
        access_checker: Arc<dyn AccessChecker>,
        user_directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            database,
            chat_service,
            access_checker,
            user_directory,
        }
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Get a chat service reference
    pub fn chat_service(&self) -> &ChatService {
        &self.chat_service
    }

    pub fn access_checker(&self) -> &dyn AccessChecker {
        self.access_checker.as_ref()
    }

    pub fn user_directory(&self) -> &dyn UserDirectory {
        self.user_directory.as_ref()
    }
}
