//! Client for the hosted completion API.
//!
//! One user message in, one reply text out. The request carries a fixed
//! model, the message as a single user turn, a bearer credential read from
//! the environment at call time, and two static identification headers.
//! No retries and no timeout: a hung upstream call hangs the relay request.

use chatbot_types::NO_RESPONSE_REPLY;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Config;

/// Failure of a completion call.
///
/// `Display` is what the relay puts in its `error` field, so it names the
/// failure kind only. An error status body is logged where it is read and
/// not kept.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("error communicating with completion API")]
    Transport(#[source] reqwest::Error),

    #[error("completion API returned status {status}")]
    Status { status: u16 },

    #[error("completion API returned a malformed body")]
    Decode(#[source] serde_json::Error),
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Turn<'a>; 1],
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone)]
pub struct CompletionApi {
    http: Client,
    endpoint: String,
    model: String,
    site_url: String,
    site_title: String,
    api_key_var: String,
}

impl CompletionApi {
    pub fn from_config(config: &Config, http: Client) -> Self {
        Self {
            http,
            endpoint: config.upstream_url.clone(),
            model: config.model.clone(),
            site_url: config.site_url.clone(),
            site_title: config.site_title.clone(),
            api_key_var: config.api_key_var.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Forward `user_message` and return the first choice's text, or
    /// [`NO_RESPONSE_REPLY`] when the answer has none.
    pub async fn complete(&self, user_message: &str) -> Result<String, UpstreamError> {
        // Not validated: a missing key surfaces as an upstream auth failure.
        let api_key = std::env::var(&self.api_key_var).unwrap_or_default();

        let body = CompletionRequest {
            model: &self.model,
            messages: [Turn {
                role: "user",
                content: user_message,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.site_title)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.endpoint, "completion request failed");
                UpstreamError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "completion API returned an error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            error!(error = %e, "failed to read completion response body");
            UpstreamError::Transport(e)
        })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            error!(error = %e, "completion response is not JSON");
            UpstreamError::Decode(e)
        })?;

        debug!(model = %self.model, "completion received");
        Ok(extract_reply(&value))
    }
}

/// `choices[0].message.content`, defaulting when absent, non-string or empty.
pub fn extract_reply(body: &Value) -> String {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_RESPONSE_REPLY)
        .to_owned()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
