//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI document endpoint (disable with `CHATBOT_ENABLE_SWAGGER=false`)
//! - Relay `/api/chat` and formatter `/api/render`
//! - Widget pages and the standalone `/chatbot.js` script
//! - Health route

mod assets;
mod chat;
pub mod doc;
mod health;
mod render;

use crate::middleware::{cors, trace};
use crate::state::AppState;
use axum::{Router, middleware};
use std::sync::Arc;
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(render::router())
        .merge(assets::router());

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}
