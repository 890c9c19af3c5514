use crate::state::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// CORS policy for the relay. The standalone script calls `/api/chat` and
/// `/api/render` from whatever page embeds it, so the default is wildcard.
pub fn cors_layer(state: Arc<AppState>) -> CorsLayer {
    let wildcard = || {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any)
    };

    let Some(origins_str) = &state.config.cors_allowed_origins else {
        // Set CHATBOT_CORS_ORIGINS to restrict embedding to known sites.
        return wildcard();
    };

    let origins: Vec<axum::http::HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        wildcard()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_headers(Any)
            .allow_methods(Any)
    }
}
