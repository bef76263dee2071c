//! Authenticated user entity.

use serde::{Deserialize, Serialize};

/// An account as reported by the auth API.
///
/// The identifier travels as `_id`; `id` is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
}
