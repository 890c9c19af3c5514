//! States, inputs and change notifications of the chat widget.

use chatbot_types::Message;
use strum::{AsRefStr, Display, EnumString};

/// Presentation variant of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Variant {
    /// Toggle button in the page corner that opens a chat panel.
    Floating,
    /// Panel covering the whole viewport; has no closed state.
    FullScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    Closed,
    Open,
}

/// Request phase. `AwaitingReply` gates resubmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    Idle,
    AwaitingReply,
}

/// Keyboard input relevant to the message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter { shift: bool },
    Other,
}

/// Emitted to subscribers after every state change.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    VisibilityChanged(Visibility),
    PhaseChanged(Phase),
    InputChanged(String),
    /// A message was appended at `index`. Hosts scroll so that this index,
    /// always the newest one, is visible.
    MessageAppended { index: usize, message: Message },
}
