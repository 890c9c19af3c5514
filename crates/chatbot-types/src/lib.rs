//! Wire types shared by the relay endpoint and the chat widget.
//!
//! The JSON shapes here are the contract between the browser widget and
//! `POST /api/chat`; field names follow the browser side (`userMessage`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Path of the relay endpoint, relative to the relay origin.
pub const RELAY_PATH: &str = "/api/chat";

/// Reply text used when the upstream answer carries no message content.
pub const NO_RESPONSE_REPLY: &str = "No response received.";

/// The only bot text a user ever sees when a relay call fails.
pub const ERROR_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

// ── Conversation ─────────────────────────────────────────────────────────────

/// Author of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single entry of the widget's transient conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

// ── Relay envelopes ──────────────────────────────────────────────────────────

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    /// Free text typed by the user. Forwarded verbatim.
    #[serde(default)]
    pub user_message: String,
}

impl RelayRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
        }
    }
}

/// Successful relay answer (HTTP 200).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RelayReply {
    /// Markdown text produced by the completion API.
    pub reply: String,
}

/// Failed relay answer (HTTP 500).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RelayFailure {
    pub error: String,
}

/// Either envelope returned by the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Reply(RelayReply),
    Failure(RelayFailure),
}

impl RelayResponse {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(RelayReply { reply: text.into() })
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(RelayFailure {
            error: message.into(),
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
