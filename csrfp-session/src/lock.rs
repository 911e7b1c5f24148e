//! Per-session mutual exclusion.
//!
//! Token issuance and consumption read, scan and then rewrite the session's
//! token sequence. Two requests for the same session must not interleave
//! those steps, so the request pipeline holds the session's lock from load to
//! save. Requests for different sessions never contend.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Registry = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Lock registry keyed by session id.
///
/// An entry lives only while some request holds or waits on it, so ids that
/// never resolve to a session leave nothing behind.
#[derive(Clone, Default)]
pub struct SessionLocks {
    locks: Registry,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`.
    pub async fn lock(&self, session_id: &str) -> SessionLockGuard {
        let mutex = self
            .locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        SessionLockGuard {
            guard: Some(mutex.lock_owned().await),
            session_id: session_id.to_string(),
            locks: self.locks.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one session; released on drop.
pub struct SessionLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    session_id: String,
    locks: Registry,
}

impl SessionLockGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The registry holds one reference; waiters hold the others.
        self.locks
            .remove_if(&self.session_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_session_is_serialized() {
        let locks = SessionLocks::new();
        let guard = locks.lock("s1").await;

        let contender = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = contender.lock("s1").await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_contend() {
        let locks = SessionLocks::new();
        let _a = locks.lock("a").await;
        let _b = tokio::time::timeout(Duration::from_millis(50), locks.lock("b"))
            .await
            .expect("lock for another session must not block");
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_released_locks_are_forgotten() {
        let locks = SessionLocks::new();
        {
            let guard = locks.lock("idle").await;
            assert_eq!(guard.session_id(), "idle");
        }
        let _held = locks.lock("held").await;

        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_survives_while_waiters_remain() {
        let locks = SessionLocks::new();
        let guard = locks.lock("s1").await;

        let contender = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = contender.lock("s1").await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
