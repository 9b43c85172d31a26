//! Client configuration resolved from CLI flags and environment variables.

use std::time::Duration;

use crate::models::SessionId;

/// Default address of the tutor backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings the query client needs to reach the remote endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Session the backend files our exchanges under.
    pub session_id: SessionId,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, session_id: SessionId, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id,
            timeout,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_BASE_URL,
            SessionId::default(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slashes() {
        let config = ClientConfig::new(
            "http://localhost:8000//",
            SessionId::new("abc"),
            Duration::from_secs(5),
        );
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.session_id.as_str(), "abc");
    }

    #[test]
    fn defaults_match_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.session_id.as_str(), "123456");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}
