//! Application layer: typed service facades over the remote API.
//!
//! Each facade wraps one [`crate::infrastructure::http::Transport`] (composition,
//! not inheritance), issues exactly one logical call per operation and returns
//! either typed data or an [`crate::error::ApiError`].
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Signup, login, logout, current user, profile
//! - [`services::url_service::UrlService`] - Shortening, deletion and analytics
//! - [`services::user_service::UserService`] - The user's own URL list

pub mod services;
