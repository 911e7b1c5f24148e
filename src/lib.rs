// csrfp - session-bound CSRF protection for server-rendered applications
//
// This library wires token issuance, validation, attack logging and failure
// handling into a single request middleware.

// Re-export core functionality
pub use csrfp_core::*;

pub use csrfp_guard;
pub use csrfp_session;

pub use csrfp_guard::{
    AttackLogger, AuthorizationEngine, CsrfpConfig, CsrfpError, CsrfpMiddleware,
    FailedAuthAction, FailureAction, FailureActionDispatcher, Protection, Token, TokenGenerator,
    TokenSource, TokenStore, UrlAllowlist, Verdict,
};

// Re-export optional crates
#[cfg(feature = "audit")]
pub use csrfp_audit;

#[cfg(feature = "config")]
pub use csrfp_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AuthorizationEngine,
        CsrfpConfig,
        CsrfpError,
        CsrfpMiddleware,
        Error,
        FailedAuthAction,
        HttpRequest,
        HttpResponse,
        Middleware,
        MiddlewareChain,
        Protection,
        RequestType,
        Verdict,
        handler_fn,
    };
    pub use csrfp_session::{MemorySessionStore, Session, SessionConfig, SessionStore};
}
