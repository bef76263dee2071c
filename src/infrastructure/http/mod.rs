//! HTTP access layer: transport, CSRF token cache and session refresh.
//!
//! One shared [`reqwest::Client`] (and therefore one cookie jar) backs every
//! [`Transport`]; each transport owns its own [`CsrfTokenCache`] and
//! [`RefreshCoordinator`].

pub mod csrf;
pub mod refresh;
pub mod request;
pub mod single_flight;
pub mod transport;

use std::time::Duration;

pub use csrf::{CSRF_HEADER, CsrfTokenCache, CsrfTokenSource, HttpCsrfSource};
pub use refresh::{
    HttpSessionRefresher, RefreshCoordinator, RefreshState, SessionGate, SessionRefresher,
};
pub use request::{ApiRequest, Attempt, endpoint_url};
pub use single_flight::SingleFlight;
pub use transport::Transport;

use crate::error::TransportError;

/// Builds the HTTP client shared by all transports of one API client.
///
/// Cookies set by the server (the session and refresh cookies) are stored in
/// the client's jar and sent back on every request.
///
/// # Errors
///
/// Returns [`TransportError::InvalidRequest`] if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TransportError::InvalidRequest(format!("Failed to build HTTP client: {e}")))
}
