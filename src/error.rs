//! Error types surfaced by the session client.

use thiserror::Error;

/// Failures raised while performing an HTTP round-trip.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Terminal outcomes of a session operation.
///
/// A 401 that is fixed by a refresh never shows up here, and neither does a
/// non-401 error status: those responses are handed back to the caller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No access token is stored; nothing was sent.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The server rejected the access token and the refresh failed. The
    /// session has been torn down.
    #[error("session expired: {reason}")]
    SessionExpired { reason: String },

    #[error("network error: {0}")]
    Network(#[from] TransportError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("login rejected with status {status}: {body}")]
    LoginRejected { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("credential store error: {0}")]
    Store(String),
}

impl SessionError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, SessionError::SessionExpired { .. })
    }
}
