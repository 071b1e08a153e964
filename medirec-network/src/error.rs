//! Typed error taxonomy for the network layer.

use serde_json::Value;
use thiserror::Error;

/// Result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur when calling the server.
///
/// Each variant is a distinct kind, not a message string: the retry policy
/// and the sync layer branch on them.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The per-call timeout elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established (offline, DNS, refused).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The server answered with HTTP >= 500.
    #[error("server error: {status}")]
    ServerError { status: u16 },

    /// The server answered 401 or 403. Never retried.
    #[error("authentication failed: {status}")]
    AuthenticationError { status: u16 },

    /// Any other 4xx. Never retried. Carries the decoded response body so
    /// conflict payloads (409) stay available to the caller.
    #[error("client error: {status}")]
    ClientError { status: u16, body: Option<Value> },

    /// Anything that does not fit the taxonomy.
    #[error("unknown network error: {0}")]
    Unknown(String),
}

impl NetworkError {
    /// Classifies an HTTP status, keeping the response body for 4xx.
    #[must_use]
    pub fn from_status(status: u16, body: Option<Value>) -> Self {
        match status {
            401 | 403 => NetworkError::AuthenticationError { status },
            500.. => NetworkError::ServerError { status },
            400..=499 => NetworkError::ClientError { status, body },
            _ => NetworkError::Unknown(format!("unexpected status {status}")),
        }
    }

    /// Whether the retry policy may re-attempt after this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            NetworkError::Timeout
                | NetworkError::ConnectionFailed(_)
                | NetworkError::ServerError { .. }
        )
    }

    /// The HTTP status this error carries, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            NetworkError::ServerError { status }
            | NetworkError::AuthenticationError { status }
            | NetworkError::ClientError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout
        } else if e.is_connect() {
            NetworkError::ConnectionFailed(e.to_string())
        } else {
            NetworkError::Unknown(e.to_string())
        }
    }
}
