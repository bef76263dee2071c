//! Shortened URL entity and client-side ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL owned by the current user.
///
/// Field names follow the API (`shortId`, `redirectURL`, `visitCount`); the
/// `redirectUrl` and `clicks` spellings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    #[serde(rename = "shortId")]
    pub short_id: String,

    #[serde(rename = "redirectURL", alias = "redirectUrl")]
    pub redirect_url: String,

    #[serde(rename = "createdBy", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "visitCount", alias = "clicks", default)]
    pub visit_count: u64,
}

/// Orderings offered for a URL list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlSort {
    #[default]
    Newest,
    Oldest,
    MostVisited,
    LeastVisited,
    ShortId,
}

impl UrlSort {
    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::Oldest,
        Self::MostVisited,
        Self::LeastVisited,
        Self::ShortId,
    ];

    /// Human-readable label for menus.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest first",
            Self::Oldest => "Oldest first",
            Self::MostVisited => "Most visited",
            Self::LeastVisited => "Least visited",
            Self::ShortId => "Short ID (A-Z)",
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::MostVisited => "most-visited",
            Self::LeastVisited => "least-visited",
            Self::ShortId => "short-id",
        }
    }
}

impl fmt::Display for UrlSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown sort '{s}', expected one of: newest, oldest, most-visited, least-visited, short-id"
                )
            })
    }
}

/// Sorts `urls` in place. Entries without a creation time always go last;
/// ties fall back to the short id.
pub fn sort_urls(urls: &mut [ShortUrl], sort: UrlSort) {
    urls.sort_by(|a, b| {
        let primary = match sort {
            UrlSort::Newest => known_first(a.created_at, b.created_at, |x, y| y.cmp(&x)),
            UrlSort::Oldest => known_first(a.created_at, b.created_at, |x, y| x.cmp(&y)),
            UrlSort::MostVisited => b.visit_count.cmp(&a.visit_count),
            UrlSort::LeastVisited => a.visit_count.cmp(&b.visit_count),
            UrlSort::ShortId => Ordering::Equal,
        };
        primary.then_with(|| a.short_id.cmp(&b.short_id))
    });
}

fn known_first<T: Copy>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
