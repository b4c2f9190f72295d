//! # Auth State
//!
//! The signed-in user, the session token and the cached store id.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use raiz_core::{CoreError, CoreResult};

/// An established session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub token: String,
    /// Resolved on sign-in; re-fetched once by `resolve_store_id` if unset.
    pub store_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct AuthState {
    session: Mutex<Option<Session>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session: Session) {
        *self.lock() = Some(session);
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.lock().is_some()
    }

    /// The session, or `NotAuthenticated`.
    pub fn require(&self) -> CoreResult<Session> {
        self.current().ok_or(CoreError::NotAuthenticated)
    }

    pub fn store_id(&self) -> Option<String> {
        self.lock().as_ref().and_then(|s| s.store_id.clone())
    }

    /// Caches the store id on the current session. No-op when signed out.
    pub fn set_store_id(&self, store_id: impl Into<String>) {
        if let Some(session) = self.lock().as_mut() {
            session.store_id = Some(store_id.into());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: "user-1".into(),
            email: "ana@example.com".into(),
            token: "token".into(),
            store_id: None,
        }
    }

    #[test]
    fn test_require_without_session() {
        let auth = AuthState::new();
        assert!(matches!(auth.require(), Err(CoreError::NotAuthenticated)));
        assert!(!auth.is_signed_in());
    }

    #[test]
    fn test_store_id_cache() {
        let auth = AuthState::new();
        auth.set_store_id("ignored");
        assert_eq!(auth.store_id(), None);

        auth.set(session());
        auth.set_store_id("store-1");
        assert_eq!(auth.store_id().as_deref(), Some("store-1"));

        auth.clear();
        assert_eq!(auth.store_id(), None);
    }
}
