//! Browser delivery of the widget.
//!
//! - `GET /`           full-screen chat page
//! - `GET /demo`       host page embedding the floating widget
//! - `GET /chatbot.js` standalone floating-widget script

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use chatbot_widget::bootstrap::{default_dependencies, MOUNT_ID, WIDGET_SCRIPT, WIDGET_STYLE};
use chatbot_widget::format::escape_html;
use chatbot_widget::render::title;
use chatbot_widget::{ChatWidget, Variant};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(full_screen_page))
        .route("/demo", get(demo_page))
        .route("/chatbot.js", get(standalone_script))
}

async fn full_screen_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(full_screen_html(&state.config.public_url))
}

async fn demo_page() -> Html<&'static str> {
    Html(DEMO_HTML)
}

async fn standalone_script(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        state.standalone_script.to_string(),
    )
}

/// Build the full-screen page around the server-rendered widget shell.
///
/// Dependencies are plain `<script src>` tags, which the browser executes
/// in document order before the mount call.
fn full_screen_html(relay_origin: &str) -> String {
    let shell = ChatWidget::new(Variant::FullScreen).render_html();
    let dependencies: String = default_dependencies()
        .iter()
        .map(|d| format!(r#"<script src="{}"></script>"#, escape_html(&d.src)))
        .collect();
    // `</` must not appear inside an inline script.
    let config = json!({ "relayOrigin": relay_origin, "variant": Variant::FullScreen.as_ref() })
        .to_string()
        .replace("</", "<\\/");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>
html,body{{margin:0;height:100%}}
{style}
</style>
</head>
<body>
<div id="{mount_id}">{shell}</div>
{dependencies}
<script>
{widget}
</script>
<script>
ChatbotWidget.mount(document.getElementById("{mount_id}"), {config});
</script>
</body>
</html>
"##,
        title = title(Variant::FullScreen),
        style = WIDGET_STYLE,
        mount_id = MOUNT_ID,
        shell = shell,
        dependencies = dependencies,
        widget = WIDGET_SCRIPT,
        config = config,
    )
}

const DEMO_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Chat widget demo</title>
</head>
<body style="font-family:sans-serif;padding:32px">
<h1>Host page</h1>
<p>The chat button in the bottom-right corner is injected by <code>/chatbot.js</code>.</p>
<script src="/chatbot.js"></script>
</body>
</html>
"#;

// ── Tests ──────────────────────────────────────────────────────────────────────
