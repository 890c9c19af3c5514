use crate::routes::{chat, health, render};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "chatbot-server",
    description = "Chat widget relay API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(chat::ChatApi::openapi());
    root.merge(render::RenderApi::openapi());
    root.merge(health::HealthApi::openapi());
    root
}
