//! Data models for the chat client.

mod message;
mod session;

pub use message::{Message, MessageRole};
pub use session::{Exchange, SessionId, DEFAULT_SESSION_ID};
