//! # csrfp guard
//!
//! Session-bound CSRF protection. Every session holds an ordered sequence of
//! issued tokens; a request is authorized when the token it submits is still
//! in that sequence. Accepting a token drops every older one and issues a
//! fresh token, which the client receives in a cookie.
//!
//! ## Features
//!
//! - POST requests are always validated; GET requests only for URLs matching
//!   the `verifyGetFor` globs
//! - Several open pages keep working: any token not yet superseded by a
//!   later accepted one is valid
//! - Failed checks are written to an attack log before the configured
//!   failure action (403, parameter stripping, redirect, custom message,
//!   500) is applied
//!
//! ## Quick Start
//!
//! ```no_run
//! use csrfp_guard::*;
//! use csrfp_session::MemorySessionStore;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<()> {
//! let config = CsrfpConfig::new("/var/log/csrfp", FailedAuthAction::new(0, 0))
//!     .with_verify_get_for(["*/admin/*"]);
//!
//! let engine = AuthorizationEngine::from_config(config)?;
//! let csrf = CsrfpMiddleware::new(engine, Arc::new(MemorySessionStore::default()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Without the middleware
//!
//! ```
//! use csrfp_audit::{AuditLogger, MemoryBackend};
//! use csrfp_core::{HttpRequest, HttpResponse};
//! use csrfp_guard::*;
//! use csrfp_session::Session;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let config = CsrfpConfig::new("/unused", FailedAuthAction::new(0, 0));
//! let logger = AttackLogger::new(AuditLogger::new(MemoryBackend::new()));
//! let engine = AuthorizationEngine::new(config, logger).unwrap();
//!
//! let mut session = Session::new("sid", Duration::from_secs(600));
//! let mut request = HttpRequest::new("GET", "/");
//!
//! let protection = engine.protect(&mut request, &mut session).await.unwrap();
//! assert_eq!(protection.verdict, Verdict::Pass);
//!
//! let response = protection.apply(HttpResponse::ok());
//! assert!(response.cookie("csrfp_token").is_some());
//! # });
//! ```

pub mod action;
pub mod allowlist;
pub mod attack;
pub mod config;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod store;
pub mod token;

pub use action::{FailureAction, FailureActionDispatcher, Verdict};
pub use allowlist::{UrlAllowlist, current_url, glob_to_regex};
pub use attack::AttackLogger;
pub use config::{CsrfpConfig, ENV_PREFIX, FailedAuthAction};
pub use engine::{AuthorizationEngine, PROTECTION_HEADER, PROTECTION_HEADER_VALUE, Protection};
pub use error::{CsrfpError, Result};
pub use middleware::CsrfpMiddleware;
pub use store::TokenStore;
pub use token::{Token, TokenGenerator, TokenSource, effective_length};
