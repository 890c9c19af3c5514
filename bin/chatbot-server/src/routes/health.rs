//! Liveness endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthStatus)))]
pub struct HealthApi;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    /// Always `"ok"`.
    pub status: String,
    pub version: String,
    /// Model every relay call is sent to.
    pub model: String,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Report that the server is up. Does not contact the completion API.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthStatus)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        model: state.upstream.model().to_owned(),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
