use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use courier_access::HttpAccessClient;
use courier_chats::{ChatService, SqlAuditLog, SqlChatStore};
use courier_config::AppConfig;
use courier_database::{initialize_database, DatabaseConnection, TransactionCoordinator};
use courier_gateway::{create_router, GatewayState};
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::DEBUG)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Every long-lived collaborator of the server, wired once at startup.
#[derive(Clone)]
pub struct BackendServices {
    pub database: DatabaseConnection,
    pub chat_service: Arc<ChatService>,
    pub access_client: Arc<HttpAccessClient>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let database = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;
        info!(kind = database.kind().as_str(), "database ready");

        let audit_log = SqlAuditLog::new();
        let chat_store = SqlChatStore::new();
        let coordinator = TransactionCoordinator::new(&database);
        let chat_service = Arc::new(ChatService::new(coordinator, chat_store, audit_log));

        let access_client = Arc::new(
            HttpAccessClient::new(&config.access).context("failed to build access client")?,
        );
        info!(base_url = %config.access.base_url, "access client ready");

        Ok(Self {
            database,
            chat_service,
            access_client,
        })
    }

    pub fn gateway_state(&self) -> GatewayState {
        GatewayState::new(
            self.database.clone(),
            Arc::clone(&self.chat_service),
            self.access_client.clone(),
            self.access_client.clone(),
        )
    }

    pub fn router(&self, config: &AppConfig) -> Router {
        create_router(self.gateway_state(), config.http.request_timeout())
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
