//! # URL Shortener Client
//!
//! A session-aware client for a cookie-authenticated URL shortener API, plus a
//! terminal front-end (`shortener`) built on top of it.
//!
//! ## Architecture
//!
//! - **Infrastructure Layer** ([`infrastructure`]) - Transport, CSRF token cache, session refresh
//! - **Application Layer** ([`application`]) - Typed service facades (auth, url, user)
//! - **Domain Layer** ([`domain`]) - Entities and the front-end's session context
//! - **API Layer** ([`api`]) - Endpoint names and wire DTOs
//!
//! ## Features
//!
//! - Cookie-based credentials shared by every area of the API
//! - Transparent session refresh on 401, single-flight per transport, one replay
//! - Lazy, single-flight CSRF token fetching with invalidation after refresh and logout
//! - Errors normalized to a single [`ApiError`] carrying the server's message
//!
//! ## Quick Start
//!
//! ```no_run
//! use url_shortener_client::prelude::*;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = url_shortener_client::config::load_from_env()?;
//! let client = ApiClient::new(&config)?;
//!
//! client
//!     .auth()
//!     .login(&LoginCredentials {
//!         email: "a@b.com".into(),
//!         password: "secret1".into(),
//!     })
//!     .await?;
//!
//! let short_id = client.urls().generate_random_short_id("https://example.com").await?;
//! println!("created {short_id}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Client configuration is loaded from environment variables via [`config::ClientConfig`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;

pub use client::ApiClient;
pub use error::{ApiError, TransportError};

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::api::dto::{LoginCredentials, SignupData, UpdateProfile};
    pub use crate::application::services::{AuthService, UrlService, UserService};
    pub use crate::client::ApiClient;
    pub use crate::domain::entities::{ShortUrl, UrlSort, User, Visit};
    pub use crate::domain::session::SessionContext;
    pub use crate::error::{ApiError, TransportError};
    pub use crate::infrastructure::http::{ApiRequest, RefreshState, Transport};
}
