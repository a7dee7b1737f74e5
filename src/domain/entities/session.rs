use crate::domain::entities::user::User;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// An authenticated session: the bearer token and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

/// Shared handle to the current session.
///
/// Created once by the facade and handed to every adapter that needs to
/// authenticate, so login and logout are the only places the token changes.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, session: Session) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(session);
        }
    }

    pub fn end(&self) -> Option<Session> {
        self.inner.write().ok().and_then(|mut guard| guard.take())
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.token.clone()))
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }

    pub fn set_user(&self, user: User) {
        if let Ok(mut guard) = self.inner.write() {
            if let Some(session) = guard.as_mut() {
                session.user = Some(user);
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
