//! Conversation controller: owns the message log and the pending gate.
//!
//! A submission is a two-step mutation. The user message is appended and the
//! gate closed in one critical section, then the backend is awaited, then the
//! assistant reply is appended and the gate reopened. The lock is never held
//! across the await.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::client::QueryBackend;
use crate::models::{Message, SessionId};

/// Greeting the log is seeded with.
pub const GREETING: &str = "Hello! I'm your Machine Learning Tutor, your AI assistant with RAG \
capabilities. I can help you analyze concepts, answer questions based on your uploaded content, \
and provide intelligent responses. Ask me anything **Related to ML**?";

/// Assistant content used when the backend call fails.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't fetch a response.";

const EVENT_CAPACITY: usize = 256;

/// Change notification for views observing the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// A message was appended to the log.
    MessageAppended(Message),
    /// The pending flag flipped.
    PendingChanged(bool),
}

/// What happened to a call to [`Conversation::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The backend replied and its text was appended.
    Answered,
    /// The backend failed and the fallback reply was appended.
    Fallback,
    /// Input was empty after trimming. Nothing changed.
    Empty,
    /// Another submission was in flight. Nothing changed.
    Busy,
}

#[derive(Debug)]
struct State {
    messages: Vec<Message>,
    pending: bool,
}

/// The chat session state machine.
///
/// Share it behind an `Arc` with whatever renders it; only `submit` mutates.
pub struct Conversation<B> {
    backend: B,
    session_id: SessionId,
    state: Mutex<State>,
    tx: broadcast::Sender<ConversationEvent>,
}

impl<B: QueryBackend> Conversation<B> {
    /// Create a conversation seeded with the assistant greeting.
    pub fn new(backend: B, session_id: SessionId) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            session_id,
            state: Mutex::new(State {
                messages: vec![Message::assistant(GREETING)],
                pending: false,
            }),
            tx,
        }
    }

    /// Submit user text and wait for the assistant reply to land in the log.
    ///
    /// Empty input and calls made while a request is outstanding are no-ops.
    /// Backend failures never escape: they become the fallback reply.
    pub async fn submit(&self, text: &str) -> Submission {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring empty submission");
            return Submission::Empty;
        }

        let user = Message::user(text);
        {
            let mut state = self.lock();
            if state.pending {
                debug!("ignoring submission while a reply is pending");
                return Submission::Busy;
            }
            state.messages.push(user.clone());
            state.pending = true;
        }
        info!(message_id = %user.id, session_id = %self.session_id, "submitting query");
        self.emit(ConversationEvent::MessageAppended(user));
        self.emit(ConversationEvent::PendingChanged(true));

        let guard = PendingGuard {
            conversation: self,
            reply: None,
        };

        match self.backend.query(&self.session_id, text).await {
            Ok(reply) => {
                guard.settle(Message::assistant(reply));
                Submission::Answered
            }
            Err(e) => {
                warn!(error = %e, "query failed, using fallback reply");
                guard.settle(Message::assistant(FALLBACK_REPLY));
                Submission::Fallback
            }
        }
    }

    /// Snapshot of the message log.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    /// Never true in practice; the log is seeded with the greeting.
    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    /// Whether a submission is waiting on the backend.
    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Subscribe to log and pending-flag changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.tx.subscribe()
    }
}

impl<B> Conversation<B> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ConversationEvent) {
        // No receivers is fine.
        let _ = self.tx.send(event);
    }

    fn finish(&self, reply: Message) {
        {
            let mut state = self.lock();
            state.messages.push(reply.clone());
            state.pending = false;
        }
        self.emit(ConversationEvent::MessageAppended(reply));
        self.emit(ConversationEvent::PendingChanged(false));
    }
}

/// Reopens the pending gate when a submission ends, however it ends.
///
/// If the submit future is dropped or unwinds before a reply is settled, the
/// fallback reply is appended so the user message is never left unanswered.
struct PendingGuard<'a, B> {
    conversation: &'a Conversation<B>,
    reply: Option<Message>,
}

impl<B> PendingGuard<'_, B> {
    fn settle(mut self, reply: Message) {
        self.reply = Some(reply);
    }
}

impl<B> Drop for PendingGuard<'_, B> {
    fn drop(&mut self) {
        let reply = self.reply.take().unwrap_or_else(|| {
            warn!("submission abandoned before a reply arrived");
            Message::assistant(FALLBACK_REPLY)
        });
        self.conversation.finish(reply);
    }
}
