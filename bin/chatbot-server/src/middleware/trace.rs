use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Bodies at or above this size are summarised instead of logged.
const MAX_LOGGED_BODY: usize = 1024;

/// Wrap each request in a span carrying a trace id.
///
/// The id is taken from an incoming `x-trace-id` header when it is a valid
/// UUID, generated otherwise, and echoed back on the response.
pub async fn trace_middleware(
    State(_state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("→ request started");
        let (parts, body) = req.into_parts();
        let req_bytes = buffer_and_log("request", &parts.headers, body).await;
        let mut req = Request::from_parts(parts, Body::from(req_bytes));
        if let Some(value) = &trace_header {
            req.headers_mut().insert(X_TRACE_ID, value.clone());
        }

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let res_bytes = buffer_and_log("response", &parts.headers, body).await;
        let mut response = Response::from_parts(parts, Body::from(res_bytes));
        if let Some(value) = trace_header {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Buffer a body and log it at debug level when it is small JSON.
async fn buffer_and_log(direction: &str, headers: &HeaderMap, body: Body) -> Bytes {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let is_json = content_type.contains("application/json");

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, direction, "failed to buffer body");
            return Bytes::new();
        }
    };

    if is_json && bytes.len() < MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            debug!(direction, body = %text, "body");
        }
    } else if !bytes.is_empty() {
        debug!(direction, content_type, size = bytes.len(), "body skipped");
    }

    bytes
}

// ── Tests ──────────────────────────────────────────────────────────────────────
