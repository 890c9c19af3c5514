//! Shared application state injected into every Axum handler.
//!
//! Immutable after startup; concurrent relay calls share it without
//! locking.

use std::sync::Arc;

use chatbot_widget::BundleError;
use chatbot_widget::bootstrap::StandaloneBundle;

use crate::config::Config;
use crate::upstream::CompletionApi;

/// State shared across all HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Completion API client; holds the pooled HTTP connection set.
    pub upstream: CompletionApi,
    /// Pre-rendered standalone widget script served at `/chatbot.js`.
    pub standalone_script: Arc<str>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, BundleError> {
        let upstream = CompletionApi::from_config(&config, reqwest::Client::new());
        let standalone_script = StandaloneBundle::new(config.public_url.as_str()).render()?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
            standalone_script: Arc::from(standalone_script),
        })
    }
}

#[cfg(test)]
pub(crate) fn test_state(upstream_url: &str) -> Arc<AppState> {
    test_state_with_key_var(upstream_url, "CHATBOT_TEST_UNSET_API_KEY")
}

/// Like [`test_state`], reading the credential from `api_key_var`.
#[cfg(test)]
pub(crate) fn test_state_with_key_var(upstream_url: &str, api_key_var: &str) -> Arc<AppState> {
    let mut config = Config::from_env();
    config.upstream_url = upstream_url.to_owned();
    config.model = "test/model".into();
    config.site_url = "https://example.test".into();
    config.site_title = "Example".into();
    config.api_key_var = api_key_var.to_owned();
    config.public_url = String::new();
    config.enable_swagger = false;
    Arc::new(AppState::new(config).expect("valid default bundle"))
}
