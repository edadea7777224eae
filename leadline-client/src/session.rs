//! Explicit session context
//!
//! A `Session` is created once per login and handed to the API client and
//! every service constructor. Clones share the same underlying data, so a
//! 401 observed by one service logs out all of them.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use shared::models::{Role, User, UserSummary};

use crate::error::{ClientError, ClientResult};

/// Session data stored in memory during the client's lifecycle.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// Bearer token for HTTP API authentication.
    pub token: Option<String>,
    /// Current user information after login.
    pub user: Option<User>,
}

impl SessionData {
    /// Sets the token and user info after successful login.
    pub fn set_login(&mut self, token: String, user: User) {
        self.token = Some(token);
        self.user = Some(user);
    }

    /// Clears the session data on logout.
    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionData>>,
}

impl Session {
    /// Empty session; every authenticated call fails locally until login
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with a token obtained elsewhere (user unknown until `me()`)
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.write().token = Some(token.into());
        session
    }

    pub fn authenticated(token: impl Into<String>, user: User) -> Self {
        let session = Self::new();
        session.write().set_login(token.into(), user);
        session
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionData> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionData> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_login(&self, token: String, user: User) {
        self.write().set_login(token, user);
    }

    pub fn set_user(&self, user: User) {
        self.write().user = Some(user);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.read().user.as_ref().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// Token for the next request; absence is a local `Unauthorized`
    pub fn require_token(&self) -> ClientResult<String> {
        self.token().ok_or(ClientError::Unauthorized)
    }

    pub fn require_user(&self) -> ClientResult<User> {
        self.user().ok_or(ClientError::Unauthorized)
    }

    /// `{id, name}` of the current user, stamped on closes and assignments
    pub fn actor(&self) -> ClientResult<UserSummary> {
        self.read()
            .user
            .as_ref()
            .map(User::summary)
            .ok_or(ClientError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            name: "Meera".into(),
            email: "meera@example.com".into(),
            role: Role::Admin,
            avatar: None,
        }
    }

    #[test]
    fn test_empty_session_requires_login() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(matches!(session.require_token(), Err(ClientError::Unauthorized)));
        assert!(matches!(session.actor(), Err(ClientError::Unauthorized)));
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::authenticated("t0k3n", user());
        let other = session.clone();
        assert_eq!(other.role(), Some(Role::Admin));

        other.clear();
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_token_only_session() {
        let session = Session::with_token("abc");
        assert_eq!(session.require_token().unwrap(), "abc");
        assert!(session.user().is_none());

        session.set_user(user());
        assert_eq!(session.actor().unwrap().name, "Meera");
    }
}
