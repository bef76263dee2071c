//! Request and response bodies exchanged with the shortener API.

pub mod auth;
pub mod urls;

pub use auth::{
    CsrfTokenResponse, LoginCredentials, MaybeUserResponse, SignupData, UpdateProfile,
    UserResponse,
};
pub use urls::{
    AnalyticsResponse, CustomShortenRequest, ShortIdResponse, ShortenRequest, UrlListResponse,
};
