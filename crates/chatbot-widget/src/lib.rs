//! chatbot-widget – the client side of the chatbot.
//!
//! - [`ChatWidget`]: conversation + `{closed, open} × {idle, awaiting-reply}` state machine
//! - [`format`]: restricted markdown formatter for bot messages
//! - [`render`]: HTML view shared by the full-screen page and the floating script
//! - [`client`]: transport to the relay endpoint
//! - [`bootstrap`]: standalone script packaging

pub mod bootstrap;
pub mod client;
pub mod error;
pub mod format;
pub mod render;
pub mod state;
mod widget;

pub use client::{HttpRelayClient, RelayClient};
pub use error::{BundleError, RelayError};
pub use state::{Key, Phase, Variant, Visibility, WidgetEvent};
pub use widget::{ChatWidget, PendingReply};
