//! Session handle and store trait.

use crate::error::{SessionError, SessionResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Session data structure.
///
/// The handle the protector reads and mutates for one request. Values are
/// stored as JSON so any backend can persist them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Session data as key-value pairs
    pub data: HashMap<String, serde_json::Value>,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last access timestamp
    pub last_accessed_at: DateTime<Utc>,
    /// Session expiration timestamp
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session with the given ID and TTL.
    pub fn new(id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            data: HashMap::new(),
            created_at: now,
            last_accessed_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or_default(),
        }
    }

    /// Check if the session has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Get a value from the session data.
    ///
    /// Returns `None` when the key is absent or holds a value of another shape.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the session data.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> SessionResult<()> {
        let json_value =
            serde_json::to_value(value).map_err(|e| SessionError::Serialization(e.to_string()))?;
        self.data.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Remove a value from the session data.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Check if a key exists in the session data.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Update the last accessed timestamp.
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// Extend the session expiration.
    pub fn extend(&mut self, ttl: Duration) {
        self.expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default();
    }
}

/// Session store trait for different storage backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a new session, using the default TTL when `ttl` is `None`.
    async fn create(&self, ttl: Option<Duration>) -> SessionResult<Session>;

    /// Get a session by ID.
    ///
    /// Returns `Ok(None)` if not found or expired.
    async fn get(&self, session_id: &str) -> SessionResult<Option<Session>>;

    /// Save/update a session.
    async fn save(&self, session: &Session) -> SessionResult<()>;

    /// Delete a session.
    async fn delete(&self, session_id: &str) -> SessionResult<()>;

    /// Check if a session exists and is valid.
    async fn exists(&self, session_id: &str) -> SessionResult<bool>;

    /// Get the number of active sessions.
    async fn count(&self) -> SessionResult<usize>;

    /// Remove expired sessions, returning how many were dropped.
    async fn cleanup_expired(&self) -> SessionResult<usize>;

    /// Get a session value by key.
    async fn get_value<T: for<'de> Deserialize<'de>>(
        &self,
        session_id: &str,
        key: &str,
    ) -> SessionResult<Option<T>>
    where
        Self: Sized,
    {
        Ok(self.get(session_id).await?.and_then(|s| s.get(key)))
    }

    /// Set a session value by key.
    async fn set_value<T: Serialize + Send>(
        &self,
        session_id: &str,
        key: &str,
        value: T,
    ) -> SessionResult<()>
    where
        Self: Sized,
    {
        let mut session = self
            .get(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        session.set(key, value)?;
        self.save(&session).await
    }
}

/// Generate a new unique session ID.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
