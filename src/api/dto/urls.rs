//! DTOs for the url and user endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ShortUrl, Visit};

/// Body of `POST /shorten`.
#[derive(Debug, Clone, Serialize)]
pub struct ShortenRequest {
    pub url: String,
}

/// Body of `POST /custom-shorten`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomShortenRequest {
    pub url: String,
    #[serde(rename = "shortId")]
    pub short_id: String,
}

/// Answer of both shorten endpoints.
#[derive(Debug, Deserialize)]
pub struct ShortIdResponse {
    #[serde(rename = "shortId")]
    pub short_id: String,
}

/// Answer of `GET /{shortId}/analytics`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsResponse {
    #[serde(default)]
    pub analytics: Vec<Visit>,
}

/// Answer of `GET /urls`.
#[derive(Debug, Default, Deserialize)]
pub struct UrlListResponse {
    #[serde(default)]
    pub urls: Vec<ShortUrl>,
}
