//! Request / response types local to this server.
//!
//! The relay envelopes live in `chatbot-types`, shared with the widget.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/render`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenderRequest {
    /// Markdown produced by the completion API.
    pub content: String,
}

/// Response body for `POST /api/render`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenderResponse {
    /// Restricted HTML: paragraphs, lists, code, strong and emphasis only.
    pub html: String,
}
