//! DTOs for the auth endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::domain::entities::User;

const REDACTED: &str = "<redacted>";

/// Body of `POST /signup`.
#[derive(Clone, Serialize)]
pub struct SignupData {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupData")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Body of `POST /login`.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Body of `PUT /update`.
///
/// `None` fields are omitted from the JSON and left unchanged by the server.
#[skip_serializing_none]
#[derive(Clone, Default, Serialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfile {
    /// Returns true if no field would be sent.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

impl fmt::Debug for UpdateProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateProfile")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .finish()
    }
}

/// `{ "user": ... }` where the user is mandatory (`GET /current-user`).
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

/// `{ "user": ... }` where the server may omit the user (login, update).
#[derive(Debug, Default, Deserialize)]
pub struct MaybeUserResponse {
    #[serde(default)]
    pub user: Option<User>,
}

/// Body of `GET /csrf-token`.
#[derive(Debug, Deserialize)]
pub struct CsrfTokenResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}
