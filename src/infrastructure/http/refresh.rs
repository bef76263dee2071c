//! Session refresh coordination.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use super::csrf::CsrfTokenCache;
use super::single_flight::SingleFlight;
use crate::error::TransportError;

/// Renews the server-side session.
///
/// # Implementations
///
/// - [`HttpSessionRefresher`] - posts to the auth API's `refresh-token` endpoint
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Exchanges the refresh cookie for a renewed session cookie.
    ///
    /// # Errors
    ///
    /// Returns the raw transport failure; the coordinator decides how it is
    /// surfaced.
    async fn refresh_session(&self) -> Result<(), TransportError>;
}

/// Posts to the refresh endpoint directly, bypassing 401 interception.
///
/// No anti-forgery header is attached: the refresh call is what makes a new
/// token obtainable in the first place.
pub struct HttpSessionRefresher {
    http: reqwest::Client,
    url: Url,
}

impl HttpSessionRefresher {
    pub fn new(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl SessionRefresher for HttpSessionRefresher {
    async fn refresh_session(&self) -> Result<(), TransportError> {
        debug!(url = %self.url, "Requesting session refresh");

        let response = self
            .http
            .post(self.url.clone())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| TransportError::network(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(TransportError::from_response_body(status, &body))
    }
}

/// Whether the user of a client has explicitly logged out.
///
/// Shared by every transport of one client. After a successful logout there is
/// no session to renew, so a 401 is returned as is instead of triggering a
/// refresh. A successful login or refresh lifts it again.
#[derive(Debug, Default)]
pub struct SessionGate {
    signed_out: AtomicBool,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_signed_out(&self) {
        self.signed_out.store(true, Ordering::SeqCst);
    }

    pub fn mark_signed_in(&self) {
        self.signed_out.store(false, Ordering::SeqCst);
    }

    pub fn is_signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }
}

/// Observable state of a [`RefreshCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Ensures at most one session refresh is in flight for one transport.
///
/// # State Machine
///
/// ```text
/// Idle ──401──▶ Refreshing ──settled──▶ Idle
/// ```
///
/// Every 401 that arrives while `Refreshing` joins the pending refresh instead
/// of starting its own. On success the transport's CSRF token is discarded
/// before any caller resumes. On failure every waiting caller receives the same
/// [`TransportError::AuthExpired`].
pub struct RefreshCoordinator {
    area: &'static str,
    refresher: Arc<dyn SessionRefresher>,
    csrf: Arc<CsrfTokenCache>,
    flight: SingleFlight<()>,
}

impl RefreshCoordinator {
    pub fn new(
        area: &'static str,
        refresher: Arc<dyn SessionRefresher>,
        csrf: Arc<CsrfTokenCache>,
    ) -> Self {
        Self {
            area,
            refresher,
            csrf,
            flight: SingleFlight::new(),
        }
    }

    /// Refreshes the session, joining a refresh already in flight if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::AuthExpired`] if the refresh failed for any reason.
    pub async fn refresh(&self) -> Result<(), TransportError> {
        let area = self.area;
        let refresher = Arc::clone(&self.refresher);
        let csrf = Arc::clone(&self.csrf);

        self.flight
            .run(move || async move {
                info!(area, "Refreshing session");
                match refresher.refresh_session().await {
                    Ok(()) => {
                        csrf.invalidate().await;
                        info!(area, "Session refreshed");
                        Ok(())
                    }
                    Err(err) => {
                        warn!(area, error = %err, "Session refresh failed");
                        Err(err.into_auth_expired())
                    }
                }
            })
            .await
    }

    pub async fn state(&self) -> RefreshState {
        if self.flight.is_pending().await {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::csrf::MockCsrfTokenSource;
    use reqwest::StatusCode;

    fn primed_cache() -> Arc<CsrfTokenCache> {
        let mut source = MockCsrfTokenSource::new();
        source
            .expect_fetch_token()
            .returning(|| Ok("token".to_string()));
        Arc::new(CsrfTokenCache::new(Arc::new(source)))
    }

    #[tokio::test]
    async fn test_successful_refresh_invalidates_csrf() {
        let csrf = primed_cache();
        csrf.get_token().await.unwrap();
        assert!(csrf.cached().await.is_some());

        let mut refresher = MockSessionRefresher::new();
        refresher
            .expect_refresh_session()
            .times(1)
            .returning(|| Ok(()));

        let coordinator = RefreshCoordinator::new("auth", Arc::new(refresher), csrf.clone());

        assert!(coordinator.refresh().await.is_ok());
        assert_eq!(csrf.cached().await, None);
        assert_eq!(coordinator.state().await, RefreshState::Idle);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_auth_expired_and_keeps_csrf() {
        let csrf = primed_cache();
        csrf.get_token().await.unwrap();

        let mut refresher = MockSessionRefresher::new();
        refresher.expect_refresh_session().times(1).returning(|| {
            Err(TransportError::Http {
                status: StatusCode::UNAUTHORIZED,
                message: "Refresh token expired".to_string(),
            })
        });

        let coordinator = RefreshCoordinator::new("url", Arc::new(refresher), csrf.clone());

        assert_eq!(
            coordinator.refresh().await,
            Err(TransportError::AuthExpired {
                message: "Refresh token expired".to_string()
            })
        );
        assert!(csrf.cached().await.is_some());
        assert_eq!(coordinator.state().await, RefreshState::Idle);
    }

    #[tokio::test]
    async fn test_each_settled_refresh_allows_a_new_one() {
        let mut refresher = MockSessionRefresher::new();
        refresher
            .expect_refresh_session()
            .times(2)
            .returning(|| Ok(()));

        let coordinator = RefreshCoordinator::new("user", Arc::new(refresher), primed_cache());

        assert!(coordinator.refresh().await.is_ok());
        assert!(coordinator.refresh().await.is_ok());
    }
}
