//! Request descriptors and attempt tracking.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use url::Url;

use crate::error::TransportError;

/// Immutable description of one API call relative to a transport's base address.
///
/// The same descriptor is sent again, unchanged, when a call is replayed after
/// a session refresh. Path segments are percent-encoded when the final URL is
/// built, so a short id containing `/` or `?` cannot escape its segment.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    body: Option<serde_json::Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    pub fn put<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::PUT, segments)
    }

    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, segments)
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the body cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, TransportError> {
        let value = serde_json::to_value(body)
            .map_err(|e| TransportError::InvalidRequest(format!("Unserializable body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Adds an extra header sent on every attempt.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Every method except GET is treated as state-changing.
    pub fn requires_csrf(&self) -> bool {
        self.method != Method::GET
    }

    /// Relative path used in log fields.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Which send of a request this is.
///
/// The first send may be answered by a session refresh; a replay never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt(u8);

impl Attempt {
    pub const FIRST: Self = Self(0);

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub const fn is_replay(self) -> bool {
        self.0 > 0
    }

    /// One-based attempt number for logging.
    pub const fn number(self) -> u8 {
        self.0.saturating_add(1)
    }
}

/// Appends percent-encoded `segments` to `base`.
///
/// # Errors
///
/// Returns [`TransportError::InvalidRequest`] if `base` cannot carry a path
/// (e.g. `mailto:` URLs).
pub fn endpoint_url<S: AsRef<str>>(base: &Url, segments: &[S]) -> Result<Url, TransportError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| TransportError::InvalidRequest(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments.iter().map(AsRef::as_ref));
    Ok(url)
}
