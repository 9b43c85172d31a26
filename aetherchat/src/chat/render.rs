//! Plain-text rendering of conversation entries.

use crate::models::{Exchange, Message, MessageRole};

/// Shown while a reply is pending.
pub const TYPING_INDICATOR: &str = "Tutor is typing...";

const fn label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "You",
        MessageRole::Assistant => "Tutor",
    }
}

/// Render a message as a header line followed by its content.
pub fn render_message(message: &Message) -> String {
    format!(
        "[{} {}]\n{}\n",
        label(message.role),
        message.display_time(),
        message.content.trim_end()
    )
}

/// Render one server-side history exchange.
pub fn render_exchange(index: usize, exchange: &Exchange) -> String {
    let reply = if exchange.rag_response.is_empty() {
        "(no response)"
    } else {
        exchange.rag_response.trim_end()
    };
    format!(
        "#{index}\n[{}]\n{}\n[{}]\n{reply}\n",
        label(MessageRole::User),
        exchange.user_query.trim_end(),
        label(MessageRole::Assistant),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_header_names_the_speaker() {
        let rendered = render_message(&Message::assistant("Gradient descent.\n\n"));
        let mut lines = rendered.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("[Tutor "));
        assert!(header.ends_with(']'));
        assert_eq!(lines.next(), Some("Gradient descent."));

        let rendered = render_message(&Message::user("hi"));
        assert!(rendered.starts_with("[You "));
    }

    #[test]
    fn empty_history_reply_is_marked() {
        let exchange = Exchange {
            user_query: "what is ML?".to_string(),
            rag_response: String::new(),
        };
        let rendered = render_exchange(1, &exchange);
        assert_eq!(rendered, "#1\n[You]\nwhat is ML?\n[Tutor]\n(no response)\n");
    }
}
