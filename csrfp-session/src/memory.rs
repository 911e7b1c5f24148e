//! In-process session storage.

use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::traits::{Session, SessionStore, generate_session_id};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Expired sessions are swept after this many creations by default.
pub const DEFAULT_CLEANUP_INTERVAL: usize = 256;

/// Session store backed by a concurrent map.
///
/// Cloning shares the underlying map. Every `cleanup_interval` creations the
/// store drops sessions that have expired.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, Session>>,
    config: SessionConfig,
    created: Arc<AtomicUsize>,
    cleanup_interval: usize,
}

impl MemorySessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config,
            created: Arc::new(AtomicUsize::new(0)),
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }

    /// Sweep expired sessions every `interval` creations; 0 disables the sweep.
    pub fn with_cleanup_interval(mut self, interval: usize) -> Self {
        self.cleanup_interval = interval;
        self
    }

    fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        before - self.sessions.len()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, ttl: Option<Duration>) -> SessionResult<Session> {
        let created = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        if self.cleanup_interval > 0 && created % self.cleanup_interval == 0 {
            let removed = self.sweep_expired();
            debug!(removed, "Swept expired sessions");
        }

        let session = Session::new(
            generate_session_id(),
            ttl.unwrap_or(self.config.default_ttl),
        );
        self.sessions.insert(session.id.clone(), session.clone());
        debug!(session_id = %session.id, "Created session");
        Ok(session)
    }

    async fn get(&self, session_id: &str) -> SessionResult<Option<Session>> {
        let Some(session) = self.sessions.get(session_id).map(|s| s.clone()) else {
            return Ok(None);
        };

        if session.is_expired() {
            self.sessions.remove(session_id);
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> SessionResult<()> {
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> SessionResult<()> {
        self.sessions.remove(session_id);
        Ok(())
    }

    async fn exists(&self, session_id: &str) -> SessionResult<bool> {
        Ok(self.get(session_id).await?.is_some())
    }

    async fn count(&self) -> SessionResult<usize> {
        Ok(self.sessions.iter().filter(|s| !s.is_expired()).count())
    }

    async fn cleanup_expired(&self) -> SessionResult<usize> {
        Ok(self.sweep_expired())
    }
}
