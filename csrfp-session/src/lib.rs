//! Session storage for csrfp.
//!
//! The protector keeps each session's issued tokens server-side. This crate
//! provides the session handle the protector mutates, the store contract
//! an application backs it with, an in-memory store, and the per-session lock
//! that serializes concurrent requests of one session.
//!
//! ```
//! use csrfp_session::*;
//!
//! # async fn example() -> Result<(), SessionError> {
//! let store = MemorySessionStore::new(SessionConfig::default());
//! let locks = SessionLocks::new();
//!
//! let mut session = store.create(None).await?;
//! let _guard = locks.lock(&session.id).await;
//! session.set("user_id", 123)?;
//! store.save(&session).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod lock;
pub mod memory;
pub mod traits;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use lock::{SessionLockGuard, SessionLocks};
pub use memory::MemorySessionStore;
pub use traits::{Session, SessionStore, generate_session_id};
