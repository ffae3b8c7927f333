//! # Courier Gateway Crate
//!
//! HTTP surface of the Courier back-end. Exposes the chat operations as JSON
//! POST routes, each gated by the access interceptor, plus an
//! unauthenticated health probe.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use courier_gateway::{create_router, GatewayState};
//!
//! # async fn serve(state: GatewayState) -> std::io::Result<()> {
//! let app = create_router(state, Duration::from_secs(30));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:50001").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use middleware::{access_interceptor, Caller};
pub use state::GatewayState;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware as axum_middleware, Router};
use tower_http::timeout::TimeoutLayer;

/// Create the main application router with all routes
///
/// `request_timeout` bounds every call, authorization check included. A call
/// that exceeds it is dropped, which rolls back its open unit of work.
pub fn create_router(state: GatewayState, request_timeout: Duration) -> Router {
    let state = Arc::new(state);

    let operations = rest::create_chat_routes().route_layer(axum_middleware::from_fn_with_state(
        Arc::clone(&state),
        middleware::access_interceptor,
    ));

    Router::new()
        .merge(operations)
        .merge(rest::create_health_routes())
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::create_trace_middleware())
}
