//! Service facades for the auth, url and user areas of the API.

pub mod auth_service;
pub mod url_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use url_service::UrlService;
pub use user_service::UserService;

use crate::error::{ApiError, TransportError};

/// Converts a transport failure into the facade-level error and logs it.
pub(crate) fn normalize_error(operation: &'static str, err: TransportError) -> ApiError {
    match err.status() {
        Some(status) => tracing::warn!(operation, status = status.as_u16(), error = %err, "API call failed"),
        None => tracing::warn!(operation, error = %err, "API call failed"),
    }
    ApiError::from(err)
}
