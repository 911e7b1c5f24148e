//! Session configuration.

use std::time::Duration;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cookie carrying the session identifier
    pub cookie_name: String,
    /// Default session TTL
    pub default_ttl: Duration,
    /// Cookie path
    pub cookie_path: String,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "CSRFP_SESSID".to_string(),
            default_ttl: Duration::from_secs(3600),
            cookie_path: "/".to_string(),
            cookie_secure: false,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the default session TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Render the `Set-Cookie` value for a session id.
    pub fn set_cookie(&self, session_id: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
            self.cookie_name,
            session_id,
            self.cookie_path,
            self.default_ttl.as_secs()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
