//! Session model for the remote query endpoint.

use serde::{Deserialize, Serialize};

/// Default session identifier used by the tutor backend.
pub const DEFAULT_SESSION_ID: &str = "123456";

/// Identifier the remote endpoint keys its history by.
///
/// The client is handed one at startup; it never invents or rotates ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_ID)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One exchange stored server-side for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user_query: String,
    pub rag_response: String,
}
