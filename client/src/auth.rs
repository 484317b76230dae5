//! Bearer credentials and session expiry bookkeeping.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

#[derive(Error, Debug, Clone)]
pub enum CredentialError {
    #[error("credential store error: {0}")]
    Store(String),
}

/// Key-value persistence for the bearer token.
pub trait CredentialStore: Send + Sync + Debug {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str) -> Result<(), CredentialError>;
    fn clear(&self) -> Result<(), CredentialError>;
}

pub type DynCredentialStore = Arc<dyn CredentialStore>;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<String> {
        self.token.read().expect("lock not poisoned").clone()
    }

    fn set_token(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.write().expect("lock not poisoned") = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.token.write().expect("lock not poisoned") = None;
        Ok(())
    }
}

/// Shared by every request issued through one client.
///
/// Besides credential access it owns the only cross-request state: the flag
/// that lets exactly one caller handle an expired session at a time.
#[derive(Debug)]
pub struct AuthSession {
    store: DynCredentialStore,
    expiry_in_progress: Mutex<bool>,
    redirect: Mutex<Option<String>>,
}

impl AuthSession {
    pub fn new(store: DynCredentialStore) -> Self {
        Self {
            store,
            expiry_in_progress: Mutex::new(false),
            redirect: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &DynCredentialStore {
        &self.store
    }

    pub fn token(&self) -> Option<String> {
        self.store.token().filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// JSON headers, plus `Authorization: Bearer <token>` unless auth is
    /// skipped or no token is stored.
    pub fn headers(&self, skip_auth: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if skip_auth {
            return headers;
        }
        if let Some(token) = self.token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "stored token is not a valid header value"),
            }
        }
        headers
    }

    /// Claim the right to handle an expired session. Returns `None` while
    /// another caller holds the claim; the claim ends when the guard drops.
    pub fn try_begin_expiry(&self) -> Option<ExpiryGuard<'_>> {
        let mut flag = self.expiry_in_progress.lock().expect("lock not poisoned");
        if *flag {
            debug!("session expiry already being handled");
            return None;
        }
        *flag = true;
        Some(ExpiryGuard { session: self })
    }

    pub fn is_expiry_in_progress(&self) -> bool {
        *self.expiry_in_progress.lock().expect("lock not poisoned")
    }

    /// Remember where the user was so login can send them back. The login
    /// and unauthorized pages themselves are never remembered.
    pub fn remember_redirect(&self, location: &str) {
        if location == LOGIN_PATH || location == UNAUTHORIZED_PATH {
            return;
        }
        *self.redirect.lock().expect("lock not poisoned") = Some(location.to_string());
    }

    pub fn take_redirect(&self) -> Option<String> {
        self.redirect.lock().expect("lock not poisoned").take()
    }
}

/// Held while a session expiry is being handled.
#[derive(Debug)]
pub struct ExpiryGuard<'a> {
    session: &'a AuthSession,
}

impl Drop for ExpiryGuard<'_> {
    fn drop(&mut self) {
        *self
            .session
            .expiry_in_progress
            .lock()
            .expect("lock not poisoned") = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: Option<&str>) -> AuthSession {
        let store = match token {
            Some(t) => MemoryCredentialStore::with_token(t),
            None => MemoryCredentialStore::new(),
        };
        AuthSession::new(Arc::new(store))
    }

    #[test]
    fn test_headers_with_token() {
        let headers = session(Some("tok")).headers(false);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_headers_skip_auth() {
        let headers = session(Some("tok")).headers(true);
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(ACCEPT).is_some());
    }

    #[test]
    fn test_headers_without_token() {
        assert!(session(None).headers(false).get(AUTHORIZATION).is_none());
        assert!(session(Some("")).headers(false).get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_expiry_guard_is_exclusive() {
        let s = session(None);
        let guard = s.try_begin_expiry().expect("first claim");
        assert!(s.is_expiry_in_progress());
        assert!(s.try_begin_expiry().is_none());
        drop(guard);
        assert!(!s.is_expiry_in_progress());
        assert!(s.try_begin_expiry().is_some());
    }

    #[test]
    fn test_expiry_guard_released_on_panic() {
        let s = session(None);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = s.try_begin_expiry().unwrap();
            panic!("handler blew up");
        }));
        assert!(result.is_err());
        assert!(!s.is_expiry_in_progress());
    }

    #[test]
    fn test_redirect_skips_auth_pages() {
        let s = session(None);
        s.remember_redirect(LOGIN_PATH);
        assert_eq!(s.take_redirect(), None);
        s.remember_redirect("/users?page=2");
        s.remember_redirect(UNAUTHORIZED_PATH);
        assert_eq!(s.take_redirect().as_deref(), Some("/users?page=2"));
        assert_eq!(s.take_redirect(), None);
    }
}
