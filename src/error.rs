//! Error taxonomy for the API-access layer.
//!
//! Two levels:
//!
//! - [`TransportError`] - what the transport, CSRF cache and refresh coordinator
//!   deal in. Carries HTTP status codes and server messages.
//! - [`ApiError`] - the only error type returned by the service facades. It
//!   holds a user-presentable message and nothing else of the original failure.

use reqwest::StatusCode;
use serde::Deserialize;

/// Message used whenever the server did not provide one.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Message used when the session could not be renewed and the server did not say why.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please log in again";

/// Failures produced below the facade boundary.
///
/// `Clone` is required because a single in-flight refresh or CSRF fetch hands
/// the same outcome to every caller awaiting it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No response was received (connect error, timeout, broken body stream).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: StatusCode, message: String },

    /// Session refresh was attempted and failed, or the replayed request was
    /// rejected again.
    #[error("Session expired: {message}")]
    AuthExpired { message: String },

    /// A 2xx response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built (bad path, unencodable header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub(crate) fn network(err: &reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }

    /// Builds an [`TransportError::Http`] from a status and the raw response body.
    pub fn from_response_body(status: StatusCode, body: &[u8]) -> Self {
        Self::Http {
            status,
            message: extract_message(body).unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        }
    }

    /// Builds an [`TransportError::AuthExpired`] from the rejected response body.
    pub fn auth_expired(body: &[u8]) -> Self {
        Self::AuthExpired {
            message: extract_message(body).unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_string()),
        }
    }

    /// Turns a failed refresh, or a replay rejected again, into a terminal expiry.
    ///
    /// A server-provided message is kept; anything else gets
    /// [`SESSION_EXPIRED_MESSAGE`].
    #[must_use]
    pub fn into_auth_expired(self) -> Self {
        match self {
            Self::AuthExpired { .. } => self,
            Self::Http { message, .. } if message != FALLBACK_MESSAGE => {
                Self::AuthExpired { message }
            }
            _ => Self::AuthExpired {
                message: SESSION_EXPIRED_MESSAGE.to_string(),
            },
        }
    }

    /// Returns true for a plain 401 that has not been through a refresh yet.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// Returns the HTTP status if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::AuthExpired { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Extracts the `message` field from a JSON error body.
///
/// Returns `None` for empty bodies, non-JSON bodies, a missing field, or an
/// empty message.
pub fn extract_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<MessageBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiErrorKind {
    Request,
    SessionExpired,
}

/// Normalized error surfaced by every service facade.
///
/// The message is either the server's `message` field or a generic fallback.
/// Status codes and raw bodies are intentionally dropped at this boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    kind: ApiErrorKind,
}

impl ApiError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ApiErrorKind::Request,
        }
    }

    /// Returns true when the session could not be renewed.
    ///
    /// The front-end is expected to drop its authenticated state and ask the
    /// user to log in again.
    pub fn is_session_expired(&self) -> bool {
        self.kind == ApiErrorKind::SessionExpired
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { message, .. } => Self::new(message),
            TransportError::AuthExpired { message } => Self {
                message,
                kind: ApiErrorKind::SessionExpired,
            },
            TransportError::Network(_)
            | TransportError::Decode(_)
            | TransportError::InvalidRequest(_) => Self::new(FALLBACK_MESSAGE),
        }
    }
}
