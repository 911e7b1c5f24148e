use crate::engine::AuthorizationEngine;
use crate::error::CsrfpError;
use async_trait::async_trait;
use csrfp_core::{Error, HttpRequest, HttpResponse, Middleware, Next};
use csrfp_session::{Session, SessionConfig, SessionLocks, SessionStore};
use std::sync::Arc;
use tracing::error;

/// CSRF protection middleware
///
/// Resolves the caller's session from its cookie, runs the engine while
/// holding that session's lock and persists the token sequence before the
/// application sees the request. Session expiry slides: every request pushes
/// it out by the configured TTL and re-sends the session cookie.
#[derive(Clone)]
pub struct CsrfpMiddleware {
    engine: Arc<AuthorizationEngine>,
    sessions: Arc<dyn SessionStore>,
    session_config: SessionConfig,
    locks: SessionLocks,
}

impl CsrfpMiddleware {
    pub fn new(engine: AuthorizationEngine, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            engine: Arc::new(engine),
            sessions,
            session_config: SessionConfig::default(),
            locks: SessionLocks::new(),
        }
    }

    /// Use a different session cookie name, lifetime or flags.
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn engine(&self) -> &AuthorizationEngine {
        &self.engine
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    pub fn locks(&self) -> &SessionLocks {
        &self.locks
    }

    /// Load the caller's session, or start a new one.
    async fn resolve_session(&self, session_id: Option<&str>) -> Result<Session, CsrfpError> {
        if let Some(id) = session_id
            && let Some(session) = self.sessions.get(id).await?
        {
            return Ok(session);
        }

        Ok(self
            .sessions
            .create(Some(self.session_config.default_ttl))
            .await?)
    }

    async fn protect(&self, req: &mut HttpRequest) -> Result<(crate::Protection, Session), CsrfpError> {
        let session_id = req.cookie(&self.session_config.cookie_name).cloned();
        let guard = match &session_id {
            Some(id) => Some(self.locks.lock(id).await),
            None => None,
        };

        let mut session = self.resolve_session(session_id.as_deref()).await?;
        let protection = self.engine.protect(req, &mut session).await?;
        session.touch();
        session.extend(self.session_config.default_ttl);
        self.sessions.save(&session).await?;

        drop(guard);
        Ok((protection, session))
    }
}

#[async_trait]
impl Middleware for CsrfpMiddleware {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let (protection, session) = self.protect(&mut req).await.inspect_err(|e| {
            error!(error = %e, path = %req.path, "CSRF protection aborted the request");
        })?;

        let response = match protection.short_circuit() {
            Some(response) => response,
            None => protection.apply(next(req).await?),
        };

        Ok(response.with_cookie(self.session_config.set_cookie(&session.id)))
    }
}
