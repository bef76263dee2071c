//! Data structures returned by the shortener API.
//!
//! # Entity Types
//!
//! - [`User`] - The authenticated account
//! - [`ShortUrl`] - A shortened URL owned by the user, with its visit count
//! - [`Visit`] - One recorded visit of a short URL
//!
//! [`UrlSort`] orders a URL list on the client side.

pub mod short_url;
pub mod user;
pub mod visit;

pub use short_url::{ShortUrl, UrlSort, sort_urls};
pub use user::User;
pub use visit::Visit;
