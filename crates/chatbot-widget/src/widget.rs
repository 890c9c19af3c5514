//! Chat widget controller.
//!
//! [`ChatWidget`] owns the conversation and the `{closed, open} × {idle,
//! awaiting-reply}` state machine. Hosts drive it with user input and
//! observe it through [`ChatWidget::subscribe`]; nothing re-renders
//! implicitly.

use chatbot_types::{ERROR_APOLOGY, Message};
use tracing::{debug, warn};

use crate::client::RelayClient;
use crate::error::RelayError;
use crate::state::{Key, Phase, Variant, Visibility, WidgetEvent};

type Listener = Box<dyn FnMut(&WidgetEvent) + Send>;

/// A relay call the host must issue after a successful [`ChatWidget::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub user_message: String,
}

pub struct ChatWidget {
    variant: Variant,
    visibility: Visibility,
    phase: Phase,
    input: String,
    messages: Vec<Message>,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("variant", &self.variant)
            .field("visibility", &self.visibility)
            .field("phase", &self.phase)
            .field("messages", &self.messages.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ChatWidget {
    pub fn new(variant: Variant) -> Self {
        let visibility = match variant {
            Variant::Floating => Visibility::Closed,
            Variant::FullScreen => Visibility::Open,
        };
        Self {
            variant,
            visibility,
            phase: Phase::Idle,
            input: String::new(),
            messages: Vec::new(),
            listeners: Vec::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Messages in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// `false` while a reply is pending; the input field and the send
    /// control are disabled in that phase.
    pub fn input_enabled(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Register a change listener. Listeners run synchronously, in
    /// registration order, after each state change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&WidgetEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ── Visibility ───────────────────────────────────────────────────────────

    /// Flip between closed and open. The full-screen variant is always open.
    pub fn toggle(&mut self) {
        match self.visibility {
            Visibility::Closed => self.open(),
            Visibility::Open => self.close(),
        }
    }

    pub fn open(&mut self) {
        self.set_visibility(Visibility::Open);
    }

    pub fn close(&mut self) {
        if self.variant == Variant::FullScreen {
            return;
        }
        self.set_visibility(Visibility::Closed);
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        if self.visibility != visibility {
            self.visibility = visibility;
            self.emit(WidgetEvent::VisibilityChanged(visibility));
        }
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Replace the pending input text. Ignored while the input is disabled.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if !self.input_enabled() {
            return;
        }
        let text = text.into();
        if text != self.input {
            self.input = text;
            self.emit(WidgetEvent::InputChanged(self.input.clone()));
        }
    }

    /// Enter without Shift submits; everything else is left to the field.
    pub fn handle_key(&mut self, key: Key) -> Option<PendingReply> {
        match key {
            Key::Enter { shift: false } => self.submit(),
            Key::Enter { shift: true } | Key::Other => None,
        }
    }

    /// Append the pending input as a user message and enter
    /// [`Phase::AwaitingReply`].
    ///
    /// Returns `None` without touching any state when the widget is closed,
    /// a reply is already pending, or the input is blank.
    pub fn submit(&mut self) -> Option<PendingReply> {
        if !self.is_open() || self.phase != Phase::Idle || self.input.trim().is_empty() {
            return None;
        }

        let user_message = std::mem::take(&mut self.input);
        self.append(Message::user(user_message.clone()));
        self.emit(WidgetEvent::InputChanged(String::new()));
        self.set_phase(Phase::AwaitingReply);
        debug!(len = user_message.len(), "message submitted");

        Some(PendingReply { user_message })
    }

    /// Complete the pending exchange. Any failure becomes the fixed
    /// apology message. Ignored when no reply is pending.
    pub fn resolve(&mut self, result: Result<String, RelayError>) {
        if self.phase != Phase::AwaitingReply {
            return;
        }
        let content = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "relay call failed");
                ERROR_APOLOGY.to_owned()
            }
        };
        self.append(Message::assistant(content));
        self.set_phase(Phase::Idle);
    }

    /// Submit the current input through `client` and wait for the reply.
    ///
    /// Returns `false` if nothing was submitted. Relay failures are absorbed
    /// into the conversation and never surface here.
    pub async fn send<C>(&mut self, client: &C) -> bool
    where
        C: RelayClient + ?Sized,
    {
        let Some(pending) = self.submit() else {
            return false;
        };
        let result = client.relay(&pending.user_message).await;
        self.resolve(result);
        true
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.emit(WidgetEvent::PhaseChanged(phase));
        }
    }

    fn append(&mut self, message: Message) {
        self.messages.push(message.clone());
        let index = self.messages.len() - 1;
        self.emit(WidgetEvent::MessageAppended { index, message });
    }

    fn emit(&mut self, event: WidgetEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
