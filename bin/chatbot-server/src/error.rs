//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{ "error": "..." }` JSON body with an appropriate status code.
//!
//! Relay failures of any kind collapse to HTTP 500. Full detail is logged;
//! the body only carries a short message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatbot_types::RelayResponse;
use thiserror::Error;
use tracing::error;

use crate::upstream::UpstreamError;

/// All errors that can occur in the chatbot-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The completion API call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The relay endpoint could not read its request body.
    #[error("invalid relay request: {0}")]
    InvalidRelayBody(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::Upstream(e) => {
                error!(error = ?e, "relay failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ServerError::InvalidRelayBody(m) => {
                error!(message = %m, "relay request body rejected");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
        };
        (status, Json(RelayResponse::failure(client_message))).into_response()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn body_of(err: ServerError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn upstream_status_maps_to_500_without_body_detail() {
        let (status, body) = body_of(ServerError::Upstream(UpstreamError::Status { status: 401 })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "completion API returned status 401" }));
    }

    #[tokio::test]
    async fn bad_request_exposes_message() {
        let (status, body) = body_of(ServerError::BadRequest("missing content".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing content");
    }
}
