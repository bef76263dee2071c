//! Domain layer: the data the client works with and the session state the
//! front-end owns.
//!
//! # Architecture
//!
//! - [`entities`] - Users, shortened URLs and visit records as returned by the API
//! - [`session`] - [`session::SessionContext`], the front-end's view of who is logged in
//!
//! Nothing here performs I/O. The service facades in
//! [`crate::application::services`] produce these types; they never mutate a
//! [`session::SessionContext`] themselves.

pub mod entities;
pub mod session;
