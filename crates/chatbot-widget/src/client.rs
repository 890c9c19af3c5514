//! Widget → relay transport.

use async_trait::async_trait;
use chatbot_types::{RELAY_PATH, RelayRequest, RelayResponse};
use reqwest::Client;
use tracing::debug;

use crate::error::RelayError;

/// Sends one user message to the relay and yields the reply text.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn relay(&self, user_message: &str) -> Result<String, RelayError>;
}

/// [`RelayClient`] speaking JSON over HTTP to `POST {origin}/api/chat`.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    http: Client,
    endpoint: String,
}

impl HttpRelayClient {
    /// `origin` is the relay's base URL, e.g. `http://localhost:3000`.
    pub fn new(origin: &str) -> Self {
        Self::with_client(Client::new(), origin)
    }

    pub fn with_client(http: Client, origin: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", origin.trim_end_matches('/'), RELAY_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn relay(&self, user_message: &str) -> Result<String, RelayError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&RelayRequest::new(user_message))
            .send()
            .await?;

        let status = response.status();
        // The body is decoded before the status check; a non-JSON body is a
        // failure regardless of status.
        let body: RelayResponse = response.json().await?;
        debug!(status = status.as_u16(), "relay answered");

        match body {
            RelayResponse::Reply(reply) if status.is_success() => Ok(reply.reply),
            RelayResponse::Reply(_) => Err(RelayError::Status {
                status: status.as_u16(),
                message: "Failed to get response".to_owned(),
            }),
            RelayResponse::Failure(failure) if !status.is_success() => Err(RelayError::Status {
                status: status.as_u16(),
                message: failure.error,
            }),
            RelayResponse::Failure(failure) => Err(RelayError::InvalidResponse(failure.error)),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn endpoint_joins_origin_and_path() {
        let client = HttpRelayClient::new("http://localhost:3000/");
        assert_eq!(client.endpoint(), "http://localhost:3000/api/chat");
    }

    #[tokio::test]
    async fn relay_returns_reply_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({ "userMessage": "hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Hello" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpRelayClient::new(&server.uri());
        assert_eq!(client.relay("hi").await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn relay_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "upstream down" })))
            .mount(&server)
            .await;

        let err = HttpRelayClient::new(&server.uri()).relay("hi").await.unwrap_err();
        match err {
            RelayError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn relay_non_json_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = HttpRelayClient::new(&server.uri()).relay("hi").await.unwrap_err();
        assert!(matches!(err, RelayError::Http(_)));
    }

    #[tokio::test]
    async fn success_without_string_reply_is_an_error() {
        for body in [json!({}), json!({ "reply": null }), json!({ "reply": 5 })] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
                .mount(&server)
                .await;

            let result = HttpRelayClient::new(&server.uri()).relay("hi").await;
            assert!(result.is_err(), "body {body} should fail");
        }
    }
}
