//! Authenticated session shared by every network call.

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::RequestBuilder;

use crate::capability::TokenStore;
use crate::error::{ClientError, Result};

/// Credentials and server location for one logged-in run.
///
/// Built once at startup and shared behind an `Arc`. After [`invalidate`]
/// every request made through it fails with
/// [`ClientError::SessionInvalidated`].
///
/// [`invalidate`]: Session::invalidate
pub struct Session {
    base_url: String,
    token: String,
    invalidated: AtomicBool,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: token.into(),
            invalidated: AtomicBool::new(false),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_valid(&self) -> bool {
        !self.invalidated.load(Ordering::Acquire)
    }

    pub fn invalidate(&self) {
        self.invalidated.store(true, Ordering::Release);
    }

    /// Join a server path onto the base URL. Absolute URLs pass through.
    pub fn resolve_url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else if path_or_url.starts_with('/') {
            format!("{}{}", self.base_url, path_or_url)
        } else {
            format!("{}/{}", self.base_url, path_or_url)
        }
    }

    /// Attach the bearer credential to a request.
    pub fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        if !self.is_valid() {
            return Err(ClientError::SessionInvalidated);
        }
        Ok(req.bearer_auth(&self.token))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Outcome of the startup authentication check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// A stored token exists; requests may proceed with it.
    Authenticated(String),
    /// No token; the user must log in at this URL first.
    Redirect(String),
}

pub struct AuthGate;

impl AuthGate {
    /// Read the stored token. Absent or blank means redirect to `login_url`.
    pub fn check(store: &dyn TokenStore, login_url: &str) -> Gate {
        match store.token() {
            Some(token) if !token.trim().is_empty() => Gate::Authenticated(token),
            _ => Gate::Redirect(login_url.to_string()),
        }
    }
}

/// Forget the stored token and invalidate the live session so any request
/// still in flight fails instead of using stale credentials.
pub fn logout(session: &Session, store: &dyn TokenStore) -> std::io::Result<()> {
    session.invalidate();
    tracing::info!("logged out");
    store.clear_token()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MemTokens(Mutex<Option<String>>);

    impl TokenStore for MemTokens {
        fn token(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }
        fn set_token(&self, token: &str) -> std::io::Result<()> {
            *self.0.lock().unwrap() = Some(token.to_string());
            Ok(())
        }
        fn clear_token(&self) -> std::io::Result<()> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    #[test]
    fn resolves_relative_and_absolute_urls() {
        let s = Session::new("http://localhost:5000/", "t");
        assert_eq!(s.base_url(), "http://localhost:5000");
        assert_eq!(s.resolve_url("/files"), "http://localhost:5000/files");
        assert_eq!(s.resolve_url("dl/a123"), "http://localhost:5000/dl/a123");
        assert_eq!(
            s.resolve_url("https://cdn.example.com/x.pdf"),
            "https://cdn.example.com/x.pdf"
        );
    }

    #[test]
    fn invalidated_session_refuses_requests() {
        let s = Session::new("http://localhost:5000", "t");
        let client = reqwest::Client::new();
        assert!(s.authorize(client.get(s.resolve_url("/files"))).is_ok());
        s.invalidate();
        assert!(matches!(
            s.authorize(client.get(s.resolve_url("/files"))),
            Err(ClientError::SessionInvalidated)
        ));
    }

    #[test]
    fn debug_hides_token() {
        let s = Session::new("http://h", "secret-token");
        assert!(!format!("{:?}", s).contains("secret-token"));
    }

    #[test]
    fn gate_redirects_without_token() {
        let store = MemTokens(Mutex::new(None));
        assert_eq!(
            AuthGate::check(&store, "http://h/login"),
            Gate::Redirect("http://h/login".into())
        );
        store.set_token("   ").unwrap();
        assert!(matches!(
            AuthGate::check(&store, "http://h/login"),
            Gate::Redirect(_)
        ));
        store.set_token("abc").unwrap();
        assert_eq!(
            AuthGate::check(&store, "http://h/login"),
            Gate::Authenticated("abc".into())
        );
    }

    #[test]
    fn logout_clears_token_and_invalidates() {
        let store = MemTokens(Mutex::new(Some("abc".into())));
        let s = Session::new("http://h", "abc");
        logout(&s, &store).unwrap();
        assert!(!s.is_valid());
        assert_eq!(store.token(), None);
        assert!(matches!(
            AuthGate::check(&store, "http://h/login"),
            Gate::Redirect(_)
        ));
    }
}
