//! Composition root for the three service facades.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::services::{AuthService, UrlService, UserService};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::infrastructure::http::{SessionGate, Transport, build_http_client};

/// Client for the whole shortener API.
///
/// All three facades share one HTTP client and therefore one cookie jar, so a
/// session established through [`Self::auth`] is used by [`Self::urls`] and
/// [`Self::users`] as well. Each facade still has its own transport with its own
/// CSRF cache and refresh slot. They also share one
/// [`SessionGate`], so after a logout no area attempts a refresh.
pub struct ApiClient {
    auth: AuthService,
    urls: UrlService,
    users: UserService,
}

impl ApiClient {
    /// Builds the client for the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an area URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = build_http_client(config.timeout()).context("Failed to build HTTP client")?;

        let auth_base = config.auth_url()?;
        let url_base = config.url_url()?;
        let user_base = config.user_url()?;

        let session = Arc::new(SessionGate::new());

        let auth = Transport::new("auth", http.clone(), auth_base.clone(), &auth_base)?
            .with_session_gate(Arc::clone(&session));
        let urls = Transport::new("url", http.clone(), url_base, &auth_base)?
            .with_session_gate(Arc::clone(&session));
        let users =
            Transport::new("user", http, user_base, &auth_base)?.with_session_gate(session);

        Ok(Self {
            auth: AuthService::new(Arc::new(auth)),
            urls: UrlService::new(Arc::new(urls)),
            users: UserService::new(Arc::new(users)),
        })
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn urls(&self) -> &UrlService {
        &self.urls
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    /// Logs out and drops the CSRF token of every transport.
    ///
    /// # Errors
    ///
    /// Returns the logout [`ApiError`]; tokens are kept in that case.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.auth.logout().await?;
        self.urls.transport().csrf().invalidate().await;
        self.users.transport().csrf().invalidate().await;
        Ok(())
    }
}
