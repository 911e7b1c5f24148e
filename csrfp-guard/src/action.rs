use crate::config::{CsrfpConfig, FailedAuthAction};
use csrfp_core::{HttpRequest, HttpResponse, RequestType};
use tracing::warn;

/// Body of the code 0 response
pub const FORBIDDEN_BODY: &str = "<h2>403 Access Forbidden by CSRFProtector!</h2>";

/// Body of the code 4 response
pub const INTERNAL_ERROR_BODY: &str = "<h2>500 Internal Server Error!</h2>";

/// What to do with a request whose token check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// 0: 403 with a fixed body
    Forbid,
    /// 1: drop the parameters of the request type and carry on
    ClearParameters,
    /// 2: redirect to `errorRedirectionPage`
    Redirect,
    /// 3: stop with `customErrorMessage` as the body
    CustomMessage,
    /// 4: 500 with a fixed body
    InternalError,
}

impl FailureAction {
    /// Codes outside 0..=4 behave like 1.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => FailureAction::Forbid,
            1 => FailureAction::ClearParameters,
            2 => FailureAction::Redirect,
            3 => FailureAction::CustomMessage,
            4 => FailureAction::InternalError,
            _ => FailureAction::ClearParameters,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            FailureAction::Forbid => 0,
            FailureAction::ClearParameters => 1,
            FailureAction::Redirect => 2,
            FailureAction::CustomMessage => 3,
            FailureAction::InternalError => 4,
        }
    }
}

/// Outcome of protecting one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Authorized, or no check required
    Pass,
    /// Stop and answer with this status and body
    Terminate { status: u16, body: String },
    /// Stop and redirect
    Redirect { location: String },
    /// The check failed, the offending parameters were removed from the
    /// request and processing continues
    Continue,
}

impl Verdict {
    /// Whether the request should reach the application.
    pub fn allows_processing(&self) -> bool {
        matches!(self, Verdict::Pass | Verdict::Continue)
    }

    /// The response that replaces the application's, for stopping verdicts.
    pub fn to_response(&self) -> Option<HttpResponse> {
        match self {
            Verdict::Terminate { status, body } => {
                Some(HttpResponse::html(body.clone()).with_status(*status))
            }
            Verdict::Redirect { location } => Some(HttpResponse::redirect(location.clone())),
            Verdict::Pass | Verdict::Continue => None,
        }
    }

    fn forbidden() -> Self {
        Verdict::Terminate {
            status: 403,
            body: FORBIDDEN_BODY.to_string(),
        }
    }
}

/// Turns the configured action code into a [`Verdict`].
#[derive(Debug, Clone)]
pub struct FailureActionDispatcher {
    actions: FailedAuthAction,
    redirect_page: Option<String>,
    custom_message: Option<String>,
}

impl FailureActionDispatcher {
    pub fn new(config: &CsrfpConfig) -> Self {
        Self {
            actions: config.failed_auth_action,
            redirect_page: config.error_redirection_page.clone(),
            custom_message: config.custom_error_message.clone(),
        }
    }

    pub fn action_for(&self, request_type: RequestType) -> FailureAction {
        self.actions.action_for(request_type)
    }

    /// Apply the action for `request_type`.
    ///
    /// Only code 1 touches the request. A redirect never falls through to
    /// the custom message. Should the page or message be missing despite
    /// validation, the request is refused with 403.
    pub fn dispatch(&self, request: &mut HttpRequest, request_type: RequestType) -> Verdict {
        let action = self.action_for(request_type);

        match action {
            FailureAction::Forbid => Verdict::forbidden(),
            FailureAction::ClearParameters => {
                request.clear_params(request_type);
                Verdict::Continue
            }
            FailureAction::Redirect => match &self.redirect_page {
                Some(page) if !page.is_empty() => Verdict::Redirect {
                    location: page.clone(),
                },
                _ => {
                    warn!(action = action.code(), "No errorRedirectionPage configured, refusing");
                    Verdict::forbidden()
                }
            },
            FailureAction::CustomMessage => match &self.custom_message {
                Some(message) => Verdict::Terminate {
                    status: 200,
                    body: message.clone(),
                },
                None => {
                    warn!(action = action.code(), "No customErrorMessage configured, refusing");
                    Verdict::forbidden()
                }
            },
            FailureAction::InternalError => Verdict::Terminate {
                status: 500,
                body: INTERNAL_ERROR_BODY.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(get: i64, post: i64) -> FailureActionDispatcher {
        let config = CsrfpConfig::new("/tmp", FailedAuthAction::new(get, post))
            .with_error_redirection_page("https://example.com/denied")
            .with_custom_error_message("<p>Request rejected</p>");
        FailureActionDispatcher::new(&config)
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(FailureAction::from_code(0), FailureAction::Forbid);
        assert_eq!(FailureAction::from_code(2), FailureAction::Redirect);
        assert_eq!(FailureAction::from_code(4), FailureAction::InternalError);
        assert_eq!(FailureAction::from_code(7), FailureAction::ClearParameters);
        assert_eq!(FailureAction::from_code(-1), FailureAction::ClearParameters);
    }

    #[test]
    fn test_forbid() {
        let mut request = HttpRequest::new("GET", "/admin");
        let verdict = dispatcher(0, 0).dispatch(&mut request, RequestType::Get);

        assert_eq!(
            verdict,
            Verdict::Terminate {
                status: 403,
                body: FORBIDDEN_BODY.to_string()
            }
        );
        assert!(!verdict.allows_processing());
    }

    #[test]
    fn test_clear_parameters_post() {
        let mut request = HttpRequest::new("POST", "/transfer?keep=1")
            .with_body_param("amount", "100")
            .with_body_param("csrfp_token", "forged");

        let verdict = dispatcher(0, 1).dispatch(&mut request, RequestType::Post);

        assert_eq!(verdict, Verdict::Continue);
        assert!(verdict.allows_processing());
        assert!(request.body_params.is_empty());
        assert_eq!(request.query("keep").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_clear_parameters_get() {
        let mut request = HttpRequest::new("GET", "/admin?id=1&csrfp_token=x");
        dispatcher(1, 0).dispatch(&mut request, RequestType::Get);

        assert!(request.query_params.is_empty());
        assert_eq!(request.request_uri(), "/admin");
    }

    #[test]
    fn test_redirect_stops_there() {
        let mut request = HttpRequest::new("POST", "/");
        let verdict = dispatcher(0, 2).dispatch(&mut request, RequestType::Post);

        assert_eq!(
            verdict,
            Verdict::Redirect {
                location: "https://example.com/denied".to_string()
            }
        );
        let response = verdict.to_response().unwrap();
        assert_eq!(response.status, 302);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_custom_message() {
        let mut request = HttpRequest::new("POST", "/");
        let verdict = dispatcher(0, 3).dispatch(&mut request, RequestType::Post);

        let response = verdict.to_response().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body_text(), "<p>Request rejected</p>");
    }

    #[test]
    fn test_internal_error() {
        let mut request = HttpRequest::new("POST", "/");
        let response = dispatcher(0, 4)
            .dispatch(&mut request, RequestType::Post)
            .to_response()
            .unwrap();

        assert_eq!(response.status, 500);
        assert_eq!(response.body_text(), INTERNAL_ERROR_BODY);
    }

    #[test]
    fn test_missing_page_falls_back_to_forbidden() {
        let config = CsrfpConfig::new("/tmp", FailedAuthAction::new(2, 3));
        let dispatcher = FailureActionDispatcher::new(&config);
        let mut request = HttpRequest::new("GET", "/");

        assert_eq!(
            dispatcher.dispatch(&mut request, RequestType::Get),
            Verdict::forbidden()
        );
        assert_eq!(
            dispatcher.dispatch(&mut request, RequestType::Post),
            Verdict::forbidden()
        );
    }
}
