//! Anti-forgery token acquisition and caching.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use super::single_flight::SingleFlight;
use crate::api::dto::CsrfTokenResponse;
use crate::error::TransportError;

/// Header carrying the anti-forgery token on state-changing calls.
pub const CSRF_HEADER: &str = "x-xsrf-token";

/// Source of fresh anti-forgery tokens.
///
/// # Implementations
///
/// - [`HttpCsrfSource`] - fetches from the auth API's `csrf-token` endpoint
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CsrfTokenSource: Send + Sync {
    /// Fetches a new token from the server.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] on a non-2xx answer,
    /// [`TransportError::Network`] if no answer arrived and
    /// [`TransportError::Decode`] if the body has no `csrfToken`.
    async fn fetch_token(&self) -> Result<String, TransportError>;
}

/// Fetches tokens with a plain GET, outside of refresh interception.
pub struct HttpCsrfSource {
    http: reqwest::Client,
    url: Url,
}

impl HttpCsrfSource {
    pub fn new(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl CsrfTokenSource for HttpCsrfSource {
    async fn fetch_token(&self) -> Result<String, TransportError> {
        debug!(url = %self.url, "Fetching CSRF token");

        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| TransportError::network(&e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(&e))?;

        if !status.is_success() {
            return Err(TransportError::from_response_body(status, &body));
        }

        let payload: CsrfTokenResponse =
            serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(payload.csrf_token)
    }
}

struct CachedToken {
    token: Option<String>,
    /// Bumped by every invalidation so that a fetch started earlier cannot
    /// repopulate the cache with a stale token.
    epoch: u64,
    /// Fetch slot of the current epoch. Replaced on invalidation, so callers
    /// arriving afterwards never join a fetch started before it.
    fetch: Arc<SingleFlight<String>>,
}

/// Holds at most one anti-forgery token for one transport.
///
/// - A cached token is returned without a network call.
/// - With nothing cached, exactly one fetch runs no matter how many callers
///   ask concurrently; they all receive its outcome.
/// - Failed fetches are not cached.
/// - After [`Self::invalidate`], the next caller starts a new fetch even if
///   an older one is still in flight.
pub struct CsrfTokenCache {
    source: Arc<dyn CsrfTokenSource>,
    state: Arc<Mutex<CachedToken>>,
}

impl CsrfTokenCache {
    pub fn new(source: Arc<dyn CsrfTokenSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(CachedToken {
                token: None,
                epoch: 0,
                fetch: Arc::new(SingleFlight::new()),
            })),
        }
    }

    /// Returns the cached token, fetching one first if necessary.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure unchanged; the next call fetches again.
    pub async fn get_token(&self) -> Result<String, TransportError> {
        let (epoch, fetch) = {
            let state = self.state.lock().await;
            if let Some(token) = &state.token {
                return Ok(token.clone());
            }
            (state.epoch, Arc::clone(&state.fetch))
        };

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);

        fetch
            .run(move || async move {
                let token = source.fetch_token().await?;

                let mut cached = state.lock().await;
                if cached.epoch == epoch {
                    cached.token = Some(token.clone());
                } else {
                    debug!("CSRF cache invalidated during fetch, not caching result");
                }

                Ok(token)
            })
            .await
    }

    /// Drops the cached token without a network call.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.token = None;
        state.epoch = state.epoch.wrapping_add(1);
        state.fetch = Arc::new(SingleFlight::new());
        debug!("CSRF token invalidated");
    }

    /// Returns the cached token, if any, without fetching.
    pub async fn cached(&self) -> Option<String> {
        self.state.lock().await.token.clone()
    }
}
