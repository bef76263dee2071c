//! Short URL creation, deletion and analytics.

use std::sync::Arc;

use tracing::{debug, info};

use super::normalize_error;
use crate::api::dto::{AnalyticsResponse, CustomShortenRequest, ShortIdResponse, ShortenRequest};
use crate::api::endpoints;
use crate::domain::entities::Visit;
use crate::error::ApiError;
use crate::infrastructure::http::{ApiRequest, Transport};

/// Facade for the url area (`{urlBase}/...`).
pub struct UrlService {
    transport: Arc<Transport>,
}

impl UrlService {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    /// Shortens `url` under a server-generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message (e.g. invalid URL).
    pub async fn generate_random_short_id(&self, url: &str) -> Result<String, ApiError> {
        let request = ApiRequest::post([endpoints::SHORTEN]).json(&ShortenRequest {
            url: url.to_string(),
        })?;

        let response: ShortIdResponse = self
            .transport
            .fetch(&request)
            .await
            .map_err(|e| normalize_error("generate_random_short_id", e))?;

        info!(short_id = %response.short_id, "Short URL created");
        Ok(response.short_id)
    }

    /// Shortens `url` under the caller-chosen `short_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message (e.g. identifier taken).
    pub async fn generate_custom_short_id(
        &self,
        url: &str,
        short_id: &str,
    ) -> Result<String, ApiError> {
        let request = ApiRequest::post([endpoints::CUSTOM_SHORTEN]).json(&CustomShortenRequest {
            url: url.to_string(),
            short_id: short_id.to_string(),
        })?;

        let response: ShortIdResponse = self
            .transport
            .fetch(&request)
            .await
            .map_err(|e| normalize_error("generate_custom_short_id", e))?;

        info!(short_id = %response.short_id, "Custom short URL created");
        Ok(response.short_id)
    }

    /// Deletes one of the user's short URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message when the body carries
    /// one (e.g. unknown short id), the generic fallback otherwise.
    pub async fn delete_url(&self, short_id: &str) -> Result<(), ApiError> {
        let short_id = short_id_segment(short_id)?;

        self.transport
            .send(&ApiRequest::delete([short_id]))
            .await
            .map_err(|e| normalize_error("delete_url", e))?;

        info!(short_id, "Short URL deleted");
        Ok(())
    }

    /// Follows the public short link and returns the URL it lands on.
    ///
    /// Redirects are followed by the HTTP client, so the result is the final
    /// destination after every hop.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message (e.g. unknown short id).
    pub async fn resolve_short_id(&self, short_id: &str) -> Result<String, ApiError> {
        let short_id = short_id_segment(short_id)?;

        let response = self
            .transport
            .execute(&ApiRequest::get([short_id]))
            .await
            .map_err(|e| normalize_error("resolve_short_id", e))?;

        let destination = response.url().to_string();
        debug!(short_id, %destination, "Short URL resolved");
        Ok(destination)
    }

    /// Returns the recorded visits of `short_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message.
    pub async fn get_analytics(&self, short_id: &str) -> Result<Vec<Visit>, ApiError> {
        let short_id = short_id_segment(short_id)?;

        let response: AnalyticsResponse = self
            .transport
            .fetch(&ApiRequest::get([short_id, endpoints::ANALYTICS]))
            .await
            .map_err(|e| normalize_error("get_analytics", e))?;

        Ok(response.analytics)
    }
}

/// Checks that `short_id` addresses exactly one path segment.
///
/// An empty identifier would address the collection itself, and `.`/`..`
/// are dropped or resolved upward when the URL is built.
fn short_id_segment(short_id: &str) -> Result<&str, ApiError> {
    match short_id.trim() {
        "" => Err(ApiError::new("Short ID must not be empty")),
        "." | ".." => Err(ApiError::new(format!("'{}' is not a valid short ID", short_id.trim()))),
        trimmed => Ok(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_segment() {
        assert_eq!(short_id_segment(" abc123 "), Ok("abc123"));
        assert_eq!(short_id_segment("a.b"), Ok("a.b"));
        assert!(short_id_segment("   ").is_err());
        assert!(short_id_segment(".").is_err());
        assert!(short_id_segment(" .. ").is_err());
    }
}
