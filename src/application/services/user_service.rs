//! The current user's URL list.

use std::sync::Arc;

use super::normalize_error;
use crate::api::dto::UrlListResponse;
use crate::api::endpoints;
use crate::domain::entities::{ShortUrl, UrlSort, sort_urls};
use crate::error::ApiError;
use crate::infrastructure::http::{ApiRequest, Transport};

/// Facade for the user area (`{userBase}/...`).
pub struct UserService {
    transport: Arc<Transport>,
}

impl UserService {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    /// Lists the user's short URLs in server order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message.
    pub async fn list_urls(&self) -> Result<Vec<ShortUrl>, ApiError> {
        let response: UrlListResponse = self
            .transport
            .fetch(&ApiRequest::get([endpoints::URLS]))
            .await
            .map_err(|e| normalize_error("list_urls", e))?;

        Ok(response.urls)
    }

    /// Lists the user's short URLs ordered by `sort`.
    ///
    /// # Errors
    ///
    /// See [`Self::list_urls`].
    pub async fn list_urls_sorted(&self, sort: UrlSort) -> Result<Vec<ShortUrl>, ApiError> {
        let mut urls = self.list_urls().await?;
        sort_urls(&mut urls, sort);
        Ok(urls)
    }
}
