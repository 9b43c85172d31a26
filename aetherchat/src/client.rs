//! HTTP client for the remote tutor endpoint.
//!
//! Endpoints:
//! - POST /query?session_id=<id> - Ask a question, body `{"user_query": ...}`
//! - GET /history?session_id=<id> - Exchanges stored for the session

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;
use crate::models::{Exchange, SessionId};

/// Errors from talking to the remote endpoint.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request never completed (connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {0}")]
    Status(StatusCode),

    /// The body was not the JSON shape we expect.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can turn a user question into assistant text.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, session_id: &SessionId, user_query: &str) -> Result<String, QueryError>;
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    user_query: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    rag_response: String,
}

/// reqwest-backed client for the tutor backend.
#[derive(Debug, Clone)]
pub struct RagClient {
    http: reqwest::Client,
    base_url: String,
}

impl RagClient {
    /// Build a client with the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, QueryError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str, session_id: &SessionId) -> String {
        format!(
            "{}/{path}?session_id={}",
            self.base_url,
            urlencoding::encode(session_id.as_str())
        )
    }

    /// Fetch the exchanges the server stored for a session.
    ///
    /// A 404 means the session has not asked anything yet.
    pub async fn history(&self, session_id: &SessionId) -> Result<Vec<Exchange>, QueryError> {
        let url = self.url("history", session_id);
        debug!(%url, "fetching history");

        let resp = self.http.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(QueryError::Status(resp.status()));
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl QueryBackend for RagClient {
    async fn query(&self, session_id: &SessionId, user_query: &str) -> Result<String, QueryError> {
        let url = self.url("query", session_id);
        debug!(%url, "posting query");

        let resp = self
            .http
            .post(&url)
            .json(&QueryRequest { user_query })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(QueryError::Status(resp.status()));
        }

        let body = resp.bytes().await?;
        let response: QueryResponse = serde_json::from_slice(&body)?;
        Ok(response.rag_response)
    }
}
