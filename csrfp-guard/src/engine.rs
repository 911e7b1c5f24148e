use crate::action::{FailureActionDispatcher, Verdict};
use crate::allowlist::{UrlAllowlist, current_url};
use crate::attack::AttackLogger;
use crate::config::CsrfpConfig;
use crate::error::Result;
use crate::store::TokenStore;
use crate::token::{Token, TokenGenerator};
use csrfp_config::Validate;
use csrfp_core::{HttpRequest, HttpResponse, RequestType};
use csrfp_session::Session;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Header marking responses that went through the protector.
pub const PROTECTION_HEADER: &str = "X-CSRF-Protection";

pub const PROTECTION_HEADER_VALUE: &str = concat!("csrfp ", env!("CARGO_PKG_VERSION"));

/// Result of [`AuthorizationEngine::protect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protection {
    pub verdict: Verdict,
    /// Token issued while handling the request, if any
    pub refreshed: Option<Token>,
    /// `Set-Cookie` value carrying the refreshed token
    pub token_cookie: Option<String>,
    /// Whether the response gets the protection header
    pub marked: bool,
}

impl Protection {
    fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            refreshed: None,
            token_cookie: None,
            marked: false,
        }
    }

    pub fn allows_processing(&self) -> bool {
        self.verdict.allows_processing()
    }

    /// Replacement response when the verdict stops the request.
    pub fn short_circuit(&self) -> Option<HttpResponse> {
        self.verdict.to_response()
    }

    /// Add the token cookie and protection header to an application response.
    pub fn apply(&self, mut response: HttpResponse) -> HttpResponse {
        if let Some(cookie) = &self.token_cookie {
            response.cookies.push(cookie.clone());
        }
        if self.marked {
            response
                .headers
                .insert(PROTECTION_HEADER.to_string(), PROTECTION_HEADER_VALUE.to_string());
        }
        response
    }
}

/// Per-request authorization
///
/// Decides whether a request needs a token, checks it against the session's
/// sequence and either refreshes the token or logs the attack and applies
/// the configured failure action.
pub struct AuthorizationEngine {
    config: Arc<CsrfpConfig>,
    generator: TokenGenerator,
    allowlist: UrlAllowlist,
    dispatcher: FailureActionDispatcher,
    attack_logger: AttackLogger,
}

impl AuthorizationEngine {
    /// Validate `config` and compile its patterns.
    pub fn new(config: CsrfpConfig, attack_logger: AttackLogger) -> Result<Self> {
        config.validate()?;
        let allowlist = UrlAllowlist::new(&config.verify_get_for)?;
        let dispatcher = FailureActionDispatcher::new(&config);

        Ok(Self {
            config: Arc::new(config),
            generator: TokenGenerator::new(),
            allowlist,
            dispatcher,
            attack_logger,
        })
    }

    /// Engine logging attacks to `config.log_directory`.
    pub fn from_config(config: CsrfpConfig) -> Result<Self> {
        let attack_logger = AttackLogger::to_directory(config.log_directory.clone());
        Self::new(config, attack_logger)
    }

    pub fn with_generator(mut self, generator: TokenGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &CsrfpConfig {
        &self.config
    }

    pub fn allowlist(&self) -> &UrlAllowlist {
        &self.allowlist
    }

    pub fn attack_logger(&self) -> &AttackLogger {
        &self.attack_logger
    }

    /// POST always; GET only for allowlisted URLs.
    pub fn requires_validation(&self, request: &HttpRequest, request_type: RequestType) -> bool {
        match request_type {
            RequestType::Post => true,
            RequestType::Get => self
                .allowlist
                .requires_get_validation(&current_url(request)),
        }
    }

    /// Run the protector over one request.
    ///
    /// `request` is only modified by failure action 1. A failed check is
    /// reported through the verdict; errors are reserved for faults such as
    /// an unreachable attack log.
    pub async fn protect(
        &self,
        request: &mut HttpRequest,
        session: &mut Session,
    ) -> Result<Protection> {
        if self.config.upstream_protected {
            debug!(path = %request.path, "Protected upstream, skipping CSRF checks");
            return Ok(Protection::new(Verdict::Pass));
        }

        let request_type = request.request_type();
        let mut protection = Protection::new(Verdict::Pass);

        if self.requires_validation(request, request_type) {
            let token_name = self.config.token_name.as_str();
            let valid = match request.params_for(request_type).get(token_name) {
                Some(presented) => TokenStore::new(session, token_name).validate_and_consume(presented),
                None => false,
            };

            if valid {
                debug!(request_type = %request_type, path = %request.path, "CSRF token accepted");
                self.refresh(session, &mut protection);
            } else {
                let action = self.dispatcher.action_for(request_type);
                warn!(
                    request_type = %request_type,
                    path = %request.path,
                    action = action.code(),
                    "CSRF token validation failed"
                );
                self.attack_logger.record(request, request_type).await?;
                protection.verdict = self.dispatcher.dispatch(request, request_type);
            }
        } else {
            debug!(request_type = %request_type, path = %request.path, "CSRF validation not required");
        }

        if !protection.allows_processing() {
            return Ok(protection);
        }

        if protection.refreshed.is_none() && !self.has_pairing(request, session) {
            self.refresh(session, &mut protection);
        }
        protection.marked = true;

        Ok(protection)
    }

    /// `Set-Cookie` value for a token.
    pub fn token_cookie(&self, token: &Token) -> String {
        format!(
            "{}={}; Path={}; Max-Age={}",
            self.config.token_name, token, self.config.cookie_path, self.config.cookie_expiry_time
        )
    }

    /// The request's token cookie is still in the session's sequence.
    fn has_pairing(&self, request: &HttpRequest, session: &mut Session) -> bool {
        let token_name = self.config.token_name.as_str();
        request
            .cookie(token_name)
            .is_some_and(|cookie| TokenStore::new(session, token_name).contains(cookie))
    }

    fn refresh(&self, session: &mut Session, protection: &mut Protection) {
        let token = self.generator.generate(self.config.token_length);
        TokenStore::new(session, &self.config.token_name).issue(&token);
        info!(session_id = %session.id, "Issued CSRF token");

        protection.token_cookie = Some(self.token_cookie(&token));
        protection.refreshed = Some(token);
    }
}
