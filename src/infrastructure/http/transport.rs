//! Credential-carrying transport with refresh-and-replay on 401.

use std::sync::Arc;

use reqwest::Response;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::csrf::{CSRF_HEADER, CsrfTokenCache, CsrfTokenSource, HttpCsrfSource};
use super::refresh::{HttpSessionRefresher, RefreshCoordinator, SessionGate, SessionRefresher};
use super::request::{ApiRequest, Attempt, endpoint_url};
use crate::api::endpoints;
use crate::error::TransportError;

/// HTTP access to one area of the API (auth, url, user).
///
/// Each transport owns its own CSRF cache and refresh slot. Several transports
/// built from clones of the same [`reqwest::Client`] share its cookie jar, which
/// is how the session cookie reaches every area.
///
/// # Request Flow
///
/// 1. Non-GET requests get `X-XSRF-TOKEN` (fetched first if not cached)
/// 2. 2xx → the response is returned
/// 3. 401 on the first attempt → one shared session refresh, then one replay
/// 4. 401 on the replay → [`TransportError::AuthExpired`]
/// 5. 401 after a logout (see [`SessionGate`]) → returned without a refresh
/// 6. Any other status → [`TransportError::Http`] with the server's message
pub struct Transport {
    area: &'static str,
    http: reqwest::Client,
    base_url: Url,
    csrf: Arc<CsrfTokenCache>,
    refresh: RefreshCoordinator,
    session: Arc<SessionGate>,
}

impl Transport {
    /// Creates a transport for `base_url` whose token and refresh endpoints live under `auth_base`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if `auth_base` cannot carry a path.
    pub fn new(
        area: &'static str,
        http: reqwest::Client,
        base_url: Url,
        auth_base: &Url,
    ) -> Result<Self, TransportError> {
        let csrf_source = HttpCsrfSource::new(
            http.clone(),
            endpoint_url(auth_base, &[endpoints::CSRF_TOKEN])?,
        );
        let refresher = HttpSessionRefresher::new(
            http.clone(),
            endpoint_url(auth_base, &[endpoints::REFRESH_TOKEN])?,
        );

        Ok(Self::with_parts(
            area,
            http,
            base_url,
            Arc::new(csrf_source),
            Arc::new(refresher),
        ))
    }

    /// Creates a transport with explicit token and refresh collaborators.
    pub fn with_parts(
        area: &'static str,
        http: reqwest::Client,
        base_url: Url,
        csrf_source: Arc<dyn CsrfTokenSource>,
        refresher: Arc<dyn SessionRefresher>,
    ) -> Self {
        let csrf = Arc::new(CsrfTokenCache::new(csrf_source));
        let refresh = RefreshCoordinator::new(area, refresher, Arc::clone(&csrf));

        Self {
            area,
            http,
            base_url,
            csrf,
            refresh,
            session: Arc::new(SessionGate::new()),
        }
    }

    /// Shares `session` with other transports of the same client.
    #[must_use]
    pub fn with_session_gate(mut self, session: Arc<SessionGate>) -> Self {
        self.session = session;
        self
    }

    pub fn area(&self) -> &'static str {
        self.area
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn csrf(&self) -> &CsrfTokenCache {
        &self.csrf
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    pub fn session_gate(&self) -> &SessionGate {
        &self.session
    }

    /// Sends `request`, refreshing the session and replaying once on a 401.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Network`] if no response was received
    /// - [`TransportError::Http`] for non-2xx answers other than 401
    /// - [`TransportError::AuthExpired`] if refresh failed or the replay got 401
    #[instrument(skip(self, request), fields(area = self.area, method = %request.method(), path = %request.path()))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response, TransportError> {
        let mut attempt = Attempt::FIRST;

        loop {
            match self.dispatch(request, attempt).await {
                Err(err) if err.is_unauthorized() => {
                    if attempt.is_replay() {
                        warn!("Request rejected again after session refresh");
                        return Err(err.into_auth_expired());
                    }

                    if self.session.is_signed_out() {
                        debug!("Received 401 after logout, not refreshing");
                        return Err(err);
                    }

                    debug!("Received 401, awaiting session refresh");
                    self.refresh.refresh().await?;
                    attempt = attempt.next();
                }
                outcome => return outcome,
            }
        }
    }

    /// Sends `request` and discards the response body.
    pub async fn send(&self, request: &ApiRequest) -> Result<(), TransportError> {
        self.execute(request).await.map(drop)
    }

    /// Sends `request` and decodes the JSON response body.
    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, TransportError> {
        let body = self.fetch_bytes(request).await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Like [`Self::fetch`], but an empty body yields `None`.
    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Option<T>, TransportError> {
        let body = self.fetch_bytes(request).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn fetch_bytes(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError> {
        let response = self.execute(request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(&e))?;
        Ok(body.to_vec())
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        attempt: Attempt,
    ) -> Result<Response, TransportError> {
        let url = endpoint_url(&self.base_url, request.segments())?;

        let mut builder = self
            .http
            .request(request.method().clone(), url)
            .headers(request.headers().clone());

        if request.requires_csrf() {
            let token = self.csrf.get_token().await?;
            let value = HeaderValue::from_str(&token).map_err(|_| {
                TransportError::InvalidRequest("CSRF token is not a valid header value".into())
            })?;
            builder = builder.header(CSRF_HEADER, value);
        }

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        debug!(attempt = attempt.number(), "Sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        debug!(attempt = attempt.number(), status = status.as_u16(), "Request failed");
        let body = response.bytes().await.unwrap_or_default();
        Err(TransportError::from_response_body(status, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::csrf::MockCsrfTokenSource;
    use crate::infrastructure::http::refresh::{MockSessionRefresher, RefreshState};
    use reqwest::StatusCode;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(
        server: &MockServer,
        csrf_source: MockCsrfTokenSource,
        refresher: MockSessionRefresher,
    ) -> Transport {
        let base = Url::parse(&format!("{}/api/url", server.uri())).unwrap();
        Transport::with_parts(
            "url",
            reqwest::Client::new(),
            base,
            Arc::new(csrf_source),
            Arc::new(refresher),
        )
    }

    #[tokio::test]
    async fn test_get_does_not_touch_csrf_or_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/url/abc123/analytics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "analytics": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut csrf = MockCsrfTokenSource::new();
        csrf.expect_fetch_token().never();
        let mut refresher = MockSessionRefresher::new();
        refresher.expect_refresh_session().never();

        let transport = transport_for(&server, csrf, refresher);
        let body: serde_json::Value = transport
            .fetch(&ApiRequest::get(["abc123", "analytics"]))
            .await
            .unwrap();

        assert_eq!(body["analytics"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_protected_call_carries_csrf_header() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/url/abc123"))
            .and(header("x-xsrf-token", "token-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut csrf = MockCsrfTokenSource::new();
        csrf.expect_fetch_token()
            .times(1)
            .returning(|| Ok("token-1".to_string()));
        let refresher = MockSessionRefresher::new();

        let transport = transport_for(&server, csrf, refresher);
        transport
            .send(&ApiRequest::delete(["abc123"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refresh_failure_is_auth_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/url/abc123/analytics"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let csrf = MockCsrfTokenSource::new();
        let mut refresher = MockSessionRefresher::new();
        refresher.expect_refresh_session().times(1).returning(|| {
            Err(TransportError::Http {
                status: StatusCode::UNAUTHORIZED,
                message: "Refresh token missing".to_string(),
            })
        });

        let transport = transport_for(&server, csrf, refresher);
        let result = transport
            .send(&ApiRequest::get(["abc123", "analytics"]))
            .await;

        assert_eq!(
            result,
            Err(TransportError::AuthExpired {
                message: "Refresh token missing".to_string()
            })
        );
        assert_eq!(
            transport.refresh_coordinator().state().await,
            RefreshState::Idle
        );
    }

    #[tokio::test]
    async fn test_non_401_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/url/missing/analytics"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "message": "Short URL not found" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let csrf = MockCsrfTokenSource::new();
        let mut refresher = MockSessionRefresher::new();
        refresher.expect_refresh_session().never();

        let transport = transport_for(&server, csrf, refresher);
        let result = transport
            .send(&ApiRequest::get(["missing", "analytics"]))
            .await;

        assert_eq!(
            result,
            Err(TransportError::Http {
                status: StatusCode::NOT_FOUND,
                message: "Short URL not found".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_optional_treats_empty_body_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/url/empty"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let transport = transport_for(
            &server,
            MockCsrfTokenSource::new(),
            MockSessionRefresher::new(),
        );
        let body: Option<serde_json::Value> = transport
            .fetch_optional(&ApiRequest::get(["empty"]))
            .await
            .unwrap();

        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_extra_headers_sent_on_first_attempt_and_replay() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/url/abc123/analytics"))
            .and(header("x-client", "shortener-cli"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/url/abc123/analytics"))
            .and(header("x-client", "shortener-cli"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "analytics": []
            })))
            .with_priority(2)
            .expect(1)
            .mount(&server)
            .await;

        let mut refresher = MockSessionRefresher::new();
        refresher
            .expect_refresh_session()
            .times(1)
            .returning(|| Ok(()));

        let transport = transport_for(&server, MockCsrfTokenSource::new(), refresher);
        let request = ApiRequest::get(["abc123", "analytics"]).header(
            reqwest::header::HeaderName::from_static("x-client"),
            HeaderValue::from_static("shortener-cli"),
        );

        transport.send(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_signed_out_transport_skips_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/url/abc123/analytics"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({ "message": "Not logged in" })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let mut refresher = MockSessionRefresher::new();
        refresher.expect_refresh_session().never();

        let gate = Arc::new(SessionGate::new());
        let transport = transport_for(&server, MockCsrfTokenSource::new(), refresher)
            .with_session_gate(Arc::clone(&gate));
        gate.mark_signed_out();

        let request = ApiRequest::get(["abc123", "analytics"]);
        let expected = Err(TransportError::Http {
            status: StatusCode::UNAUTHORIZED,
            message: "Not logged in".to_string(),
        });

        assert_eq!(transport.send(&request).await, expected);
        assert!(transport.session_gate().is_signed_out());
        assert_eq!(transport.send(&request).await, expected);
    }

    #[tokio::test]
    async fn test_signed_in_again_refreshes_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/url/abc123/analytics"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let mut refresher = MockSessionRefresher::new();
        refresher
            .expect_refresh_session()
            .times(1)
            .returning(|| Ok(()));

        let transport = transport_for(&server, MockCsrfTokenSource::new(), refresher);
        transport.session_gate().mark_signed_out();
        transport.session_gate().mark_signed_in();

        let result = transport
            .send(&ApiRequest::get(["abc123", "analytics"]))
            .await;

        assert!(matches!(result, Err(TransportError::AuthExpired { .. })));
    }
}
