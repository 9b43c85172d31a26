//! Interactive terminal session over a [`Conversation`].

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::Receiver;

use super::controller::{Conversation, ConversationEvent};
use super::render::{render_message, TYPING_INDICATOR};
use crate::client::QueryBackend;

const QUIT_COMMAND: &str = "/quit";

/// Read questions from stdin until EOF or `/quit`, printing replies as they land.
pub async fn run_repl<B: QueryBackend>(conversation: &Conversation<B>) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run_session(
        conversation,
        input,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await
}

/// Drive a session from `input`. Replies go to `out`, the typing indicator to `status`.
async fn run_session<B, R, W, S>(
    conversation: &Conversation<B>,
    input: R,
    out: &mut W,
    status: &mut S,
) -> Result<()>
where
    B: QueryBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
    S: Write,
{
    for message in conversation.messages() {
        writeln!(out, "{}", render_message(&message))?;
    }
    writeln!(out, "Session {}", conversation.session_id())?;
    writeln!(out, "(type {QUIT_COMMAND} or press Ctrl-D to leave)")?;

    let mut events = conversation.subscribe();
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush().context("Failed to flush output")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            writeln!(out)?;
            break;
        };
        if line.trim() == QUIT_COMMAND {
            break;
        }

        let submit = conversation.submit(&line);
        tokio::pin!(submit);
        loop {
            tokio::select! {
                _ = &mut submit => break,
                event = events.recv() => {
                    if let Ok(event) = event {
                        show(&event, out, status)?;
                    }
                }
            }
        }
        drain(&mut events, out, status)?;
    }

    Ok(())
}

fn drain(
    events: &mut Receiver<ConversationEvent>,
    out: &mut impl Write,
    status: &mut impl Write,
) -> std::io::Result<()> {
    while let Ok(event) = events.try_recv() {
        show(&event, out, status)?;
    }
    Ok(())
}

fn show(
    event: &ConversationEvent,
    out: &mut impl Write,
    status: &mut impl Write,
) -> std::io::Result<()> {
    match event {
        ConversationEvent::PendingChanged(true) => writeln!(status, "{TYPING_INDICATOR}"),
        // The user's own line is already on screen.
        ConversationEvent::MessageAppended(message) if !message.is_user() => {
            writeln!(out, "{}", render_message(message))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::chat::controller::{FALLBACK_REPLY, GREETING};
    use crate::client::QueryError;
    use crate::models::SessionId;

    struct Tutor(Option<&'static str>);

    #[async_trait]
    impl QueryBackend for Tutor {
        async fn query(&self, _: &SessionId, _: &str) -> Result<String, QueryError> {
            self.0
                .map(str::to_string)
                .ok_or(QueryError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
        }
    }

    async fn drive(reply: Option<&'static str>, script: &str) -> (String, String, usize) {
        let conversation = Conversation::new(Tutor(reply), SessionId::new("123456"));
        let mut out = Vec::new();
        let mut status = Vec::new();

        run_session(&conversation, script.as_bytes(), &mut out, &mut status)
            .await
            .unwrap();

        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(status).unwrap(),
            conversation.len(),
        )
    }

    #[tokio::test]
    async fn prints_indicator_and_reply_but_not_the_question() {
        let (out, status, len) = drive(
            Some("Principal components are orthogonal directions."),
            "What is PCA?\n/quit\nnever asked\n",
        )
        .await;

        assert_eq!(len, 3);
        assert!(out.contains(GREETING));
        assert!(out.contains("Session 123456"));
        assert!(out.contains("Principal components are orthogonal directions."));
        assert!(!out.contains("What is PCA?"));
        assert!(!out.contains("[You "));
        assert_eq!(status.matches(TYPING_INDICATOR).count(), 1);
    }

    #[tokio::test]
    async fn blank_lines_do_not_show_the_indicator() {
        let (out, status, len) = drive(Some("unused"), "\n   \n").await;

        assert_eq!(len, 1);
        assert!(status.is_empty());
        assert!(!out.contains("unused"));
    }

    #[tokio::test]
    async fn failed_query_prints_fallback_and_continues_until_eof() {
        let (out, status, len) = drive(None, "first\nsecond\n").await;

        assert_eq!(len, 5);
        assert_eq!(out.matches(FALLBACK_REPLY).count(), 2);
        assert_eq!(status.matches(TYPING_INDICATOR).count(), 2);
    }
}
