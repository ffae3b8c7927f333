//! Access interception and request tracing

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use courier_access::AccessDecision;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, warn, Level};

use crate::error::GatewayError;
use crate::state::GatewayState;

/// Identity of an authorized caller, inserted into the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
}

/// Gate every operation behind the external authorization check.
///
/// The operation name passed to the check is the request path. The handler
/// only runs for an `Allowed` verdict.
pub async fn access_interceptor(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let credential = bearer_credential(request.headers())
        .ok_or(GatewayError::Unauthenticated)?
        .to_owned();
    let operation = request.uri().path().to_owned();

    match state.access_checker().check(&credential, &operation).await {
        Ok(AccessDecision::Allowed { user_id }) => {
            request.extensions_mut().insert(Caller { user_id });
            Ok(next.run(request).await)
        }
        Ok(AccessDecision::Denied { reason }) => {
            warn!(operation, %reason, "access denied");
            Err(GatewayError::PermissionDenied)
        }
        Err(err) => {
            error!(operation, error = %err, "access check failed");
            Err(GatewayError::AccessUnavailable)
        }
    }
}

fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Create tracing middleware
pub fn create_trace_middleware() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
