//! Cached session state shared by the navigation guard and the API client.
//!
//! The session lives in a [`SessionStore`] under two fixed keys: `token` (the
//! opaque credential) and `isAdmin` (`"true"`/`"false"`). [`Session`] is the only
//! way the rest of the crate touches those keys, which keeps the admin flag from
//! ever outliving the token.

pub mod store;

pub use self::store::{FileStore, MemoryStore, SessionStore};

use secrecy::SecretString;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const TOKEN_KEY: &str = "token";
pub const ADMIN_KEY: &str = "isAdmin";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no session token present")]
    NoToken,
}

/// Point-in-time view of the session, as consumed by the guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub logged_in: bool,
    pub admin: bool,
}

/// Session context handed to the guard and the client.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn raw_token(&self) -> Option<String> {
        self.store
            .get(TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    /// The session token, if one is stored. Blank values count as absent.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.raw_token().map(SecretString::from)
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.raw_token().is_some()
    }

    /// Admin flag; only honoured while a token is present.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_logged_in() && self.store.get(ADMIN_KEY).as_deref() == Some("true")
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let logged_in = self.is_logged_in();
        SessionSnapshot {
            logged_in,
            admin: logged_in && self.store.get(ADMIN_KEY).as_deref() == Some("true"),
        }
    }

    /// Stores a freshly issued token. The admin flag starts out false until the
    /// role has been fetched.
    ///
    /// # Errors
    /// Returns an error if the store cannot persist the token.
    pub fn establish(&self, token: &str) -> Result<(), SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::NoToken);
        }
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(ADMIN_KEY, "false")?;
        debug!("session established");
        Ok(())
    }

    /// # Errors
    /// Returns `SessionError::NoToken` when called without a token, or a storage error.
    pub fn set_admin(&self, admin: bool) -> Result<(), SessionError> {
        if !self.is_logged_in() {
            return Err(SessionError::NoToken);
        }
        self.store.set(ADMIN_KEY, if admin { "true" } else { "false" })
    }

    /// Drops every key in the store.
    ///
    /// # Errors
    /// Returns an error if the cleared state cannot be persisted.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        debug!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn empty_session_is_logged_out() {
        let session = Session::in_memory();
        assert!(session.token().is_none());
        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }

    #[test]
    fn establish_sets_token_and_resets_admin() {
        let store = Arc::new(MemoryStore::new());
        store.set(ADMIN_KEY, "true").unwrap();
        let session = Session::new(store.clone());

        session.establish("abc").unwrap();

        assert_eq!(session.token().unwrap().expose_secret(), "abc");
        assert_eq!(store.get(ADMIN_KEY).as_deref(), Some("false"));
        assert!(!session.is_admin());
    }

    #[test]
    fn establish_rejects_blank_token() {
        let session = Session::in_memory();
        assert!(matches!(session.establish("  "), Err(SessionError::NoToken)));
        assert!(!session.is_logged_in());
    }

    #[test]
    fn admin_flag_requires_token() {
        let session = Session::in_memory();
        assert!(matches!(session.set_admin(true), Err(SessionError::NoToken)));

        session.establish("abc").unwrap();
        session.set_admin(true).unwrap();
        assert_eq!(
            session.snapshot(),
            SessionSnapshot {
                logged_in: true,
                admin: true
            }
        );
    }

    #[test]
    fn stale_admin_flag_without_token_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.set(ADMIN_KEY, "true").unwrap();
        let session = Session::new(store);

        assert!(!session.is_admin());
        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }

    #[test]
    fn malformed_admin_flag_reads_false() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "abc").unwrap();
        store.set(ADMIN_KEY, "yes").unwrap();
        let session = Session::new(store);

        assert!(session.is_logged_in());
        assert!(!session.is_admin());
    }

    #[test]
    fn clear_removes_token_and_flag() {
        let session = Session::in_memory();
        session.establish("abc").unwrap();
        session.set_admin(true).unwrap();

        session.clear().unwrap();

        assert!(!session.is_logged_in());
        assert!(!session.is_admin());
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::in_memory();
        session.establish("super-secret").unwrap();
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
