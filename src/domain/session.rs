//! Front-end session state.

use crate::domain::entities::User;

/// The front-end's knowledge of who is logged in.
///
/// The session itself lives on the server behind an httponly cookie; this is
/// only the derived view used to pick menus and greet the user. It is owned
/// and passed around explicitly by the front-end. The service facades never
/// touch it: the front-end calls [`Self::set_session`] after a successful login
/// or current-user lookup and [`Self::clear_session`] after logout or a
/// session-expired error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<User>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_session(&mut self, user: User) {
        tracing::debug!(user_id = %user.id, "Session established");
        self.user = Some(user);
    }

    pub fn clear_session(&mut self) {
        if self.user.take().is_some() {
            tracing::debug!("Session cleared");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
