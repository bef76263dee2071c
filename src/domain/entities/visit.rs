//! Visit record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded visit of a short URL, as collected by the analytics backend.
///
/// Every attribute is optional: the backend only records what it could derive
/// from the visiting request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
}
