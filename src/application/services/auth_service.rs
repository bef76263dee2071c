//! Account and session operations against the auth API.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, info};

use super::normalize_error;
use crate::api::dto::{LoginCredentials, MaybeUserResponse, SignupData, UpdateProfile, UserResponse};
use crate::api::endpoints;
use crate::domain::entities::User;
use crate::error::ApiError;
use crate::infrastructure::http::{ApiRequest, Transport};

/// Facade for the auth area (`{authBase}/...`).
///
/// Never mutates front-end session state; callers decide what a returned user
/// or a session-expired error means for their UI.
pub struct AuthService {
    transport: Arc<Transport>,
}

impl AuthService {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    /// Creates an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message (e.g. email already taken).
    pub async fn signup(&self, data: &SignupData) -> Result<(), ApiError> {
        let request = ApiRequest::post([endpoints::SIGNUP]).json(data)?;
        self.transport
            .send(&request)
            .await
            .map_err(|e| normalize_error("signup", e))
    }

    /// Logs in; the server answers with session cookies stored in the shared jar.
    ///
    /// Returns the user when the server echoes one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message (e.g. invalid credentials).
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Option<User>, ApiError> {
        let request = ApiRequest::post([endpoints::LOGIN]).json(credentials)?;
        let response = self
            .transport
            .fetch_optional::<MaybeUserResponse>(&request)
            .await
            .map_err(|e| normalize_error("login", e))?;

        self.transport.session_gate().mark_signed_in();
        info!(email = %credentials.email, "Logged in");
        Ok(response.and_then(|r| r.user))
    }

    /// Ends the server session and drops this transport's CSRF token.
    ///
    /// Until the next login, a 401 on any transport sharing this one's
    /// [`SessionGate`](crate::infrastructure::http::SessionGate) is final and
    /// no refresh is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the server rejected the call; the CSRF token is
    /// kept in that case since the session may still be alive.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.transport
            .send(&ApiRequest::post([endpoints::LOGOUT]))
            .await
            .map_err(|e| normalize_error("logout", e))?;

        self.transport.csrf().invalidate().await;
        self.transport.session_gate().mark_signed_out();
        info!("Logged out");
        Ok(())
    }

    /// Returns the logged-in user, or `None` when there is no valid session.
    ///
    /// A 401 that survives the refresh attempt (including a failed refresh) is
    /// reported as `None` rather than an error, so callers can tell "definitely
    /// logged out" from a transient failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for every failure other than 401.
    pub async fn get_current_user(&self) -> Result<Option<User>, ApiError> {
        match self
            .transport
            .fetch::<UserResponse>(&ApiRequest::get([endpoints::CURRENT_USER]))
            .await
        {
            Ok(response) => Ok(Some(response.user)),
            Err(err) if err.status() == Some(StatusCode::UNAUTHORIZED) => {
                debug!("No authenticated user");
                Ok(None)
            }
            Err(err) => Err(normalize_error("get_current_user", err)),
        }
    }

    /// Updates name, email and/or password. Unset fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] with the server's message.
    pub async fn update_profile(&self, update: &UpdateProfile) -> Result<Option<User>, ApiError> {
        let request = ApiRequest::put([endpoints::UPDATE_PROFILE]).json(update)?;
        let response = self
            .transport
            .fetch_optional::<MaybeUserResponse>(&request)
            .await
            .map_err(|e| normalize_error("update_profile", e))?;

        Ok(response.and_then(|r| r.user))
    }

    /// Renews the session now, joining a refresh already in flight.
    ///
    /// # Errors
    ///
    /// Returns a session-expired [`ApiError`] if the refresh was rejected.
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        self.transport
            .refresh_coordinator()
            .refresh()
            .await
            .map_err(|e| normalize_error("refresh_session", e))?;

        self.transport.session_gate().mark_signed_in();
        Ok(())
    }

    /// Returns true if the server recognizes the current session.
    ///
    /// # Errors
    ///
    /// See [`Self::get_current_user`].
    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.get_current_user().await?.is_some())
    }
}
