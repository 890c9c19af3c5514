//! Relay endpoint: `POST /api/chat`.
//!
//! Forwards one user message to the completion API and answers with the
//! first reply's text. Stateless; every request is forwarded 1:1.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use chatbot_types::{RelayFailure, RelayReply, RelayRequest};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(relay),
    components(schemas(RelayRequest, RelayReply, RelayFailure))
)]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/chat", post(relay))
}

/// Relay a user message to the completion API.
///
/// A reply without message content yields `"No response received."` with
/// status 200. Any failure, including an unreadable request body, yields
/// status 500 with an `error` message.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = RelayRequest,
    responses(
        (status = 200, description = "Reply relayed", body = RelayReply),
        (status = 500, description = "Relay failed", body = RelayFailure),
    )
)]
pub async fn relay(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayReply>, ServerError> {
    let Json(req) = payload.map_err(|e| ServerError::InvalidRelayBody(e.body_text()))?;

    debug!(message_len = req.user_message.len(), "relaying message");
    let reply = state.upstream.complete(&req.user_message).await?;
    info!(reply_len = reply.len(), "relay completed");

    Ok(Json(RelayReply { reply }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use crate::routes;
    use crate::state::{AppState, test_state, test_state_with_key_var};
    use std::sync::Arc;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tracing_test::traced_test;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UPSTREAM_PATH: &str = "/api/v1/chat/completions";

    async fn post_chat(upstream: &str, body: Body) -> (StatusCode, Value) {
        post_chat_to(test_state(upstream), body).await
    }

    async fn post_chat_to(state: Arc<AppState>, body: Body) -> (StatusCode, Value) {
        let app = routes::build(state);
        let res = app
            .oneshot(
                Request::post("/api/chat")
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn upstream_answering(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn message(text: &str) -> Body {
        Body::from(json!({ "userMessage": text }).to_string())
    }

    #[tokio::test]
    async fn relays_first_choice_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .and(body_json(json!({
                "model": "test/model",
                "messages": [{ "role": "user", "content": "Hi there" }]
            })))
            .and(header_exists("authorization"))
            .and(header("http-referer", "https://example.test"))
            .and(header("x-title", "Example"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "Hello" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());
        let (status, body) = post_chat(&upstream, message("Hi there")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "reply": "Hello" }));
    }

    #[tokio::test]
    async fn missing_choices_defaults_with_success_status() {
        let server = upstream_answering(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" }))).await;
        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());

        let (status, body) = post_chat(&upstream, message("hi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "reply": "No response received." }));
    }

    #[tokio::test]
    async fn upstream_error_status_is_500_with_error_field() {
        let server = upstream_answering(
            ResponseTemplate::new(401).set_body_json(json!({ "error": { "message": "No auth credentials found" } })),
        )
        .await;
        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());

        let (status, body) = post_chat(&upstream, message("hi")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = body["error"].as_str().expect("error field");
        assert!(error.contains("401"));
        assert!(!error.contains("credentials"));
        assert!(body.get("reply").is_none());
    }

    #[tokio::test]
    async fn unreachable_upstream_is_500() {
        // Nothing listens on the discard port.
        let (status, body) = post_chat("http://127.0.0.1:9/v1/chat", message("hi")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "error communicating with completion API");
    }

    #[tokio::test]
    async fn non_json_upstream_body_is_500() {
        let server = upstream_answering(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());

        let (status, body) = post_chat(&upstream, message("hi")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unreadable_request_body_is_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());

        let (status, body) = post_chat(&upstream, Body::from("not json")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn message_is_forwarded_without_sanitizing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "model": "test/model",
                "messages": [{ "role": "user", "content": "  <b>raw</b>  " }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());

        let (status, _) = post_chat(&upstream, message("  <b>raw</b>  ")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_comes_from_configured_variable_at_request_time() {
        const VAR: &str = "CHATBOT_TEST_RELAY_BEARER_KEY";
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .and(header("authorization", "Bearer sk-rotated-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .and(header("authorization", "Bearer sk-initial-1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());
        // State is built before the variable is set and reused across
        // both calls, so the key cannot have been captured at startup.
        let state = test_state_with_key_var(&upstream, VAR);

        // SAFETY: VAR is only touched by this test.
        unsafe { std::env::set_var(VAR, "sk-initial-1") };
        let (status, _) = post_chat_to(Arc::clone(&state), message("hi")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        // SAFETY: as above.
        unsafe { std::env::set_var(VAR, "sk-rotated-2") };
        let (status, body) = post_chat_to(state, message("hi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "reply": "ok" }));

        // SAFETY: as above.
        unsafe { std::env::remove_var(VAR) };
    }

    #[tokio::test]
    async fn unset_credential_still_forwards() {
        const VAR: &str = "CHATBOT_TEST_RELAY_NEVER_SET_KEY";
        // SAFETY: VAR is only touched by this test.
        unsafe { std::env::remove_var(VAR) };

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "anonymous" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());
        let (status, body) = post_chat_to(test_state_with_key_var(&upstream, VAR), message("hi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "reply": "anonymous" }));
    }

    #[tokio::test]
    #[traced_test]
    async fn upstream_error_body_is_logged_once() {
        let server = upstream_answering(
            ResponseTemplate::new(403).set_body_string("quota exhausted for key sk-abc"),
        )
        .await;
        let upstream = format!("{}{UPSTREAM_PATH}", server.uri());

        let (status, body) = post_chat(&upstream, message("hi")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("quota exhausted"));

        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|l| l.contains("quota exhausted")).count() {
                1 => Ok(()),
                n => Err(format!("upstream body logged {n} times")),
            }
        });
    }
}
