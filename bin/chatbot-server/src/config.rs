//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for chatbot-server.
///
/// Every field has a default so the server starts without any environment
/// variables set. The completion API credential is deliberately not part of
/// this struct: it is read from the environment on every relay call.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins. `None` allows any
    /// origin, which the standalone script needs when embedded on foreign
    /// pages.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Origin the standalone script uses to reach this server. Empty means
    /// same-origin relative requests.
    pub public_url: String,

    /// Completion API endpoint.
    pub upstream_url: String,

    /// Model identifier sent with every completion request.
    pub model: String,

    /// Value of the `HTTP-Referer` identification header.
    pub site_url: String,

    /// Value of the `X-Title` identification header.
    pub site_title: String,

    /// Name of the environment variable holding the API credential.
    pub api_key_var: String,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("CHATBOT_BIND", "0.0.0.0:3000"),
            log_level: env_or("CHATBOT_LOG", "info"),
            log_json: parse_bool("CHATBOT_LOG_JSON", false),
            cors_allowed_origins: std::env::var("CHATBOT_CORS_ORIGINS").ok(),
            enable_swagger: parse_bool("CHATBOT_ENABLE_SWAGGER", true),
            public_url: env_or("CHATBOT_PUBLIC_URL", ""),
            upstream_url: env_or(
                "CHATBOT_UPSTREAM_URL",
                "https://openrouter.ai/api/v1/chat/completions",
            ),
            model: env_or("CHATBOT_MODEL", "deepseek/deepseek-r1:free"),
            site_url: env_or("CHATBOT_SITE_URL", "https://www.sitename.com"),
            site_title: env_or("CHATBOT_SITE_TITLE", "SiteName"),
            api_key_var: env_or("CHATBOT_API_KEY_VAR", "OPENROUTER_API_KEY"),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
