//! `POST /api/render`: bot markdown → restricted HTML.
//!
//! The browser widget formats bot messages through this endpoint so the
//! page and the terminal client share one formatter.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use chatbot_widget::format;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::{RenderRequest, RenderResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(render), components(schemas(RenderRequest, RenderResponse)))]
pub struct RenderApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/render", post(render))
}

#[utoipa::path(
    post,
    path = "/api/render",
    tag = "chat",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Formatted HTML", body = RenderResponse),
        (status = 400, description = "Bad request"),
    )
)]
pub async fn render(
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<RenderResponse>, ServerError> {
    let Json(req) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    Ok(Json(RenderResponse {
        html: format::render_markdown_html(&req.content),
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
