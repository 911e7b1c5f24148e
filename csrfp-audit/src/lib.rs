//! Attack logging for csrfp
//!
//! When a request fails token validation the protector writes an
//! [`AttackRecord`] before it decides the response. This crate holds the
//! record type, the sinks it can go to, and value masking.
//!
//! # Quick Start
//!
//! ```no_run
//! use csrfp_audit::*;
//! use csrfp_core::RequestType;
//!
//! # async fn example() -> Result<(), AuditBackendError> {
//! let audit = AuditLogger::builder()
//!     .backend(FileBackend::new("/var/log/csrfp"))
//!     .build();
//!
//! audit
//!     .log(AttackRecord::new(RequestType::Post)
//!         .host("example.com")
//!         .request_uri("/account/delete"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod event;
pub mod logger;
pub mod masking;

pub use backend::*;
pub use event::*;
pub use logger::*;
pub use masking::*;
