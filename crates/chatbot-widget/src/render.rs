//! HTML view of a [`ChatWidget`].
//!
//! The markup is shared by the server-rendered full-screen page and the
//! standalone floating script; the browser driver (`assets/widget.js`)
//! binds to the element ids used here.

use chatbot_types::{Message, Role};

use crate::format::{render_literal_html, render_markdown_html};
use crate::state::{Variant, Visibility};
use crate::widget::ChatWidget;

pub const PLACEHOLDER: &str = "Type your message...";

/// Shown in the full-screen message list until the first message arrives.
pub const EMPTY_PROMPT: &str = "How can we help you today?";

/// Header text of the chat panel.
pub fn title(variant: Variant) -> &'static str {
    match variant {
        Variant::Floating => "Chat Support",
        Variant::FullScreen => "Chat with us",
    }
}

fn empty_prompt_html() -> String {
    format!(r#"<div class="cb-empty" id="cb-empty">{EMPTY_PROMPT}</div>"#)
}

/// One chat bubble. Bot content is formatted, user content is literal.
pub fn message_html(message: &Message) -> String {
    let (side, body) = match message.role {
        Role::User => ("user", render_literal_html(&message.content)),
        Role::Assistant => ("bot", render_markdown_html(&message.content)),
    };
    format!(
        r#"<div class="cb-row cb-row-{side}"><div class="cb-bubble cb-bubble-{side}">{body}</div></div>"#
    )
}

fn typing_html() -> &'static str {
    concat!(
        r#"<div class="cb-row cb-row-bot" id="cb-typing">"#,
        r#"<div class="cb-bubble cb-bubble-bot cb-typing">"#,
        r#"<span class="cb-dot"></span><span class="cb-dot"></span><span class="cb-dot"></span>"#,
        r#"</div></div>"#,
    )
}

impl ChatWidget {
    /// Render the complete widget markup for the current state.
    pub fn render_html(&self) -> String {
        let floating = self.variant() == Variant::Floating;
        let disabled = if self.input_enabled() { "" } else { " disabled" };

        let mut messages = String::new();
        if !floating && self.messages().is_empty() {
            messages.push_str(&empty_prompt_html());
        }
        for message in self.messages() {
            messages.push_str(&message_html(message));
        }
        if !self.input_enabled() {
            messages.push_str(typing_html());
        }

        let close = if floating {
            r#"<button type="button" class="cb-close" id="cb-close" aria-label="Close chat"><i data-feather="x"></i></button>"#
        } else {
            ""
        };
        let hidden = if self.visibility() == Visibility::Closed { " hidden" } else { "" };

        let mut html = format!(
            concat!(
                r#"<div class="cb-root cb-{variant}" data-variant="{variant}" data-visibility="{visibility}" data-phase="{phase}">"#,
                r#"<div class="cb-panel" id="cb-panel"{hidden}>"#,
                r#"<div class="cb-header"><h3 class="cb-title">{title}</h3>{close}</div>"#,
                r#"<div class="cb-messages" id="cb-messages">{messages}<div class="cb-end" id="cb-end"></div></div>"#,
                r#"<div class="cb-input-bar">"#,
                r#"<input type="text" class="cb-input" id="cb-input" placeholder="{placeholder}" aria-label="Message input" value="{input}"{disabled}>"#,
                r#"<button type="button" class="cb-send" id="cb-send" aria-label="Send message"{disabled}><i data-feather="send"></i></button>"#,
                r#"</div></div>"#,
            ),
            variant = self.variant().as_ref(),
            visibility = self.visibility().as_ref(),
            phase = self.phase().as_ref(),
            hidden = hidden,
            title = title(self.variant()),
            close = close,
            messages = messages,
            placeholder = PLACEHOLDER,
            input = render_literal_html(self.input()),
            disabled = disabled,
        );

        if floating {
            let (label, icon) = match self.visibility() {
                Visibility::Open => ("Close chat", "x"),
                Visibility::Closed => ("Open chat", "message-square"),
            };
            html.push_str(&format!(
                r#"<button type="button" class="cb-toggle" id="cb-toggle" aria-label="{label}"><i data-feather="{icon}"></i></button>"#
            ));
        }
        html.push_str("</div>");
        html
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bot_bubble_is_formatted_user_bubble_is_literal() {
        let bot = message_html(&Message::assistant("**hi**"));
        let user = message_html(&Message::user("**hi**"));
        assert!(bot.contains("<strong>hi</strong>"));
        assert!(bot.contains("cb-bubble-bot"));
        assert!(user.contains(">**hi**</div>"));
        assert!(!user.contains("<strong>"));
    }

    #[test]
    fn closed_floating_widget_hides_panel() {
        let w = ChatWidget::new(Variant::Floating);
        let html = w.render_html();
        assert!(html.contains(r#"id="cb-panel" hidden"#));
        assert!(html.contains(r#"aria-label="Open chat""#));
    }

    #[test]
    fn full_screen_has_no_toggle_or_close() {
        let html = ChatWidget::new(Variant::FullScreen).render_html();
        assert!(html.contains("cb-full-screen"));
        assert!(!html.contains("cb-toggle"));
        assert!(!html.contains("cb-close"));
        assert!(!html.contains(" hidden"));
    }

    #[test]
    fn awaiting_reply_disables_input_and_shows_typing() {
        let mut w = ChatWidget::new(Variant::FullScreen);
        w.set_input("hello");
        w.submit();
        let html = w.render_html();
        assert!(html.contains("id=\"cb-typing\""));
        assert!(html.contains("aria-label=\"Message input\" value=\"\" disabled"));
        assert!(html.contains("aria-label=\"Send message\" disabled"));
        assert!(html.contains("data-phase=\"awaiting-reply\""));
    }

    #[test]
    fn messages_render_in_order() {
        let mut w = ChatWidget::new(Variant::FullScreen);
        w.set_input("first");
        w.submit();
        w.resolve(Ok("second".into()));
        let html = w.render_html();
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn title_depends_on_variant() {
        let floating = ChatWidget::new(Variant::Floating).render_html();
        let full = ChatWidget::new(Variant::FullScreen).render_html();
        assert!(floating.contains(r#"<h3 class="cb-title">Chat Support</h3>"#));
        assert!(full.contains(r#"<h3 class="cb-title">Chat with us</h3>"#));
    }

    #[test]
    fn empty_full_screen_shows_prompt_until_first_message() {
        let mut w = ChatWidget::new(Variant::FullScreen);
        assert!(w.render_html().contains(EMPTY_PROMPT));

        w.set_input("hi");
        w.submit();
        let html = w.render_html();
        assert!(!html.contains(EMPTY_PROMPT));
        assert!(!html.contains("cb-empty"));
    }

    #[test]
    fn floating_never_shows_prompt() {
        let mut w = ChatWidget::new(Variant::Floating);
        w.open();
        assert!(!w.render_html().contains(EMPTY_PROMPT));
    }
}
