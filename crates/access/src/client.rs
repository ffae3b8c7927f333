use async_trait::async_trait;
use courier_config::AccessConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{AccessChecker, AccessDecision, AccessError, AccessResult, UserDirectory};

pub const CHECK_PATH: &str = "/access_v1.Access/Check";
pub const RESOLVE_USERNAMES_PATH: &str = "/user_v1.User/ResolveUsernames";

/// HTTP client for the authorization service and the user directory.
#[derive(Clone)]
pub struct HttpAccessClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    endpoint: &'a str,
}

#[derive(Deserialize)]
struct CheckResponse {
    user_id: i64,
}

#[derive(Serialize)]
struct ResolveRequest<'a> {
    usernames: &'a [String],
}

#[derive(Deserialize)]
struct ResolveResponse {
    ids: Vec<i64>,
}

impl HttpAccessClient {
    pub fn new(config: &AccessConfig) -> AccessResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("courier-backend")
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AccessChecker for HttpAccessClient {
    async fn check(&self, credential: &str, operation: &str) -> AccessResult<AccessDecision> {
        let response = self
            .http
            .post(self.url(CHECK_PATH))
            .header(AUTHORIZATION, format!("Bearer {credential}"))
            .json(&CheckRequest {
                endpoint: operation,
            })
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: CheckResponse = response.json().await?;
                debug!(operation, user_id = body.user_id, "access granted");
                Ok(AccessDecision::Allowed {
                    user_id: body.user_id,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let reason = response.text().await.unwrap_or_default();
                debug!(operation, %reason, "access denied");
                Ok(AccessDecision::Denied { reason })
            }
            status => {
                warn!(operation, %status, "access check returned unexpected status");
                Err(AccessError::Protocol {
                    endpoint: CHECK_PATH,
                    detail: format!("status {status}"),
                })
            }
        }
    }
}

#[async_trait]
impl UserDirectory for HttpAccessClient {
    async fn resolve_usernames(&self, usernames: &[String]) -> AccessResult<Vec<i64>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .post(self.url(RESOLVE_USERNAMES_PATH))
            .json(&ResolveRequest { usernames })
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: ResolveResponse = response.json().await?;
                if body.ids.len() != usernames.len() {
                    return Err(AccessError::Protocol {
                        endpoint: RESOLVE_USERNAMES_PATH,
                        detail: format!(
                            "expected {} ids, got {}",
                            usernames.len(),
                            body.ids.len()
                        ),
                    });
                }
                Ok(body.ids)
            }
            StatusCode::NOT_FOUND => {
                let name = response.text().await.unwrap_or_default();
                Err(AccessError::UnknownUser(name))
            }
            status => Err(AccessError::Protocol {
                endpoint: RESOLVE_USERNAMES_PATH,
                detail: format!("status {status}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> HttpAccessClient {
        HttpAccessClient::new(&AccessConfig {
            base_url: format!("{base_url}/"),
            request_timeout_seconds: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn check_forwards_credential_and_operation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHECK_PATH))
            .and(header("authorization", "Bearer token-1"))
            .and(body_json(serde_json::json!({ "endpoint": "/chat_v1.Chat/Create" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "user_id": 42 })))
            .expect(1)
            .mount(&server)
            .await;

        let decision = test_client(&server.uri())
            .check("token-1", "/chat_v1.Chat/Create")
            .await
            .unwrap();

        assert_eq!(decision, AccessDecision::Allowed { user_id: 42 });
    }

    #[tokio::test]
    async fn check_maps_forbidden_to_denied() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHECK_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("role lacks access"))
            .mount(&server)
            .await;

        let decision = test_client(&server.uri())
            .check("token-2", "/chat_v1.Chat/Delete")
            .await
            .unwrap();

        assert_eq!(
            decision,
            AccessDecision::Denied {
                reason: "role lacks access".into()
            }
        );
    }

    #[tokio::test]
    async fn check_treats_server_errors_as_protocol_failures() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHECK_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .check("token-3", "/chat_v1.Chat/SendMessage")
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::Protocol { endpoint: CHECK_PATH, .. }));
    }

    #[tokio::test]
    async fn check_times_out_as_transport_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHECK_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "user_id": 1 }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .check("slow", "/chat_v1.Chat/Create")
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::Transport(_)));
    }

    #[tokio::test]
    async fn resolve_preserves_order() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RESOLVE_USERNAMES_PATH))
            .and(body_json(serde_json::json!({ "usernames": ["bob", "alice"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ids": [2, 1] })))
            .mount(&server)
            .await;

        let ids = test_client(&server.uri())
            .resolve_usernames(&["bob".to_string(), "alice".to_string()])
            .await
            .unwrap();

        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn resolve_reports_unknown_user() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RESOLVE_USERNAMES_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_string("mallory"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .resolve_usernames(&["mallory".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::UnknownUser(name) if name == "mallory"));
    }

    #[tokio::test]
    async fn resolve_rejects_short_answers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(RESOLVE_USERNAMES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ids": [1] })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .resolve_usernames(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::Protocol { .. }));
    }

    #[tokio::test]
    async fn resolve_skips_the_call_for_no_names() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let ids = test_client(&server.uri()).resolve_usernames(&[]).await.unwrap();
        assert!(ids.is_empty());
    }
}
