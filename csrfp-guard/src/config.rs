use crate::action::FailureAction;
use crate::allowlist::UrlAllowlist;
use crate::error::Result;
use crate::token::DEFAULT_TOKEN_LENGTH;
use csrfp_config::{ConfigError, ConfigManager, ConfigValidator, Validate};
use csrfp_core::RequestType;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Environment variables with this prefix override file settings.
pub const ENV_PREFIX: &str = "CSRFP";

/// Keys a configuration source must provide.
pub const REQUIRED_KEYS: &[&str] = &["failedAuthAction", "logDirectory"];

/// Protector configuration.
///
/// Keys are camelCase in every source format. Built once at startup and
/// shared read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfpConfig {
    /// Session key, parameter name and cookie name of the token
    #[serde(default = "default_token_name")]
    pub token_name: String,

    /// Characters per generated token; numbers and numeric strings are
    /// accepted, anything else reads as 0
    #[serde(default = "default_token_length", deserialize_with = "lenient_length")]
    pub token_length: usize,

    pub failed_auth_action: FailedAuthAction,

    /// GET requests to URLs matching any of these globs are validated
    #[serde(default)]
    pub verify_get_for: Vec<String>,

    /// Token cookie lifetime in seconds
    #[serde(default = "default_cookie_expiry_time")]
    pub cookie_expiry_time: i64,

    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// Directory receiving the daily attack logs; must already exist
    pub log_directory: PathBuf,

    #[serde(default)]
    pub error_redirection_page: Option<String>,

    #[serde(default)]
    pub custom_error_message: Option<String>,

    /// A lower layer already enforces CSRF protection; skip all checks
    #[serde(default)]
    pub upstream_protected: bool,
}

/// Failure action code per request type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAuthAction {
    #[serde(rename = "GET", default, deserialize_with = "lenient_code")]
    pub get: i64,
    #[serde(rename = "POST", default, deserialize_with = "lenient_code")]
    pub post: i64,
}

impl FailedAuthAction {
    pub fn new(get: i64, post: i64) -> Self {
        Self { get, post }
    }

    pub fn code_for(&self, request_type: RequestType) -> i64 {
        match request_type {
            RequestType::Get => self.get,
            RequestType::Post => self.post,
        }
    }

    pub fn action_for(&self, request_type: RequestType) -> FailureAction {
        FailureAction::from_code(self.code_for(request_type))
    }

    fn uses(&self, action: FailureAction) -> bool {
        self.action_for(RequestType::Get) == action || self.action_for(RequestType::Post) == action
    }
}

fn default_token_name() -> String {
    "csrfp_token".to_string()
}

fn default_token_length() -> usize {
    DEFAULT_TOKEN_LENGTH
}

fn default_cookie_expiry_time() -> i64 {
    1800
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn lenient_length<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<usize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(usize::try_from(lenient_int(&value)).unwrap_or(0))
}

fn lenient_code<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_int(&value))
}

/// Integer reading of a loosely typed value: `"20"` and `20.0` are 20,
/// leading digits of a string count, everything else is 0.
fn lenient_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => leading_int(s),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn leading_int(raw: &str) -> i64 {
    let raw = raw.trim();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let magnitude = digits.parse::<i64>().unwrap_or(0);
    if negative { -magnitude } else { magnitude }
}

impl CsrfpConfig {
    /// Configuration with defaults for everything but the required keys.
    pub fn new(log_directory: impl Into<PathBuf>, failed_auth_action: FailedAuthAction) -> Self {
        Self {
            token_name: default_token_name(),
            token_length: default_token_length(),
            failed_auth_action,
            verify_get_for: Vec::new(),
            cookie_expiry_time: default_cookie_expiry_time(),
            cookie_path: default_cookie_path(),
            log_directory: log_directory.into(),
            error_redirection_page: None,
            custom_error_message: None,
            upstream_protected: false,
        }
    }

    /// Build from collected configuration keys, checking required keys first.
    pub fn from_manager(manager: &ConfigManager) -> Result<Self> {
        ConfigValidator::require_keys(&manager.to_value(), REQUIRED_KEYS)?;
        Ok(manager.load_validated()?)
    }

    /// Load a `.json`, `.toml` or `.env` file, then apply `CSRFP_*`
    /// environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut manager = ConfigManager::with_prefix(ENV_PREFIX);
        manager.load_file_auto(path)?.load_env();
        Self::from_manager(&manager)
    }

    /// Load from a `.env` file in the working directory, if any, and the
    /// process environment.
    pub fn from_env() -> Result<Self> {
        let mut manager = ConfigManager::with_prefix(ENV_PREFIX);
        manager.load_dotenv(None)?.load_env();
        Self::from_manager(&manager)
    }

    pub fn with_token_name(mut self, name: impl Into<String>) -> Self {
        self.token_name = name.into();
        self
    }

    pub fn with_token_length(mut self, length: usize) -> Self {
        self.token_length = length;
        self
    }

    pub fn with_failed_auth_action(mut self, actions: FailedAuthAction) -> Self {
        self.failed_auth_action = actions;
        self
    }

    pub fn with_verify_get_for<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verify_get_for = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cookie_expiry_time(mut self, seconds: i64) -> Self {
        self.cookie_expiry_time = seconds;
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_error_redirection_page(mut self, page: impl Into<String>) -> Self {
        self.error_redirection_page = Some(page.into());
        self
    }

    pub fn with_custom_error_message(mut self, message: impl Into<String>) -> Self {
        self.custom_error_message = Some(message.into());
        self
    }

    pub fn with_upstream_protected(mut self, protected: bool) -> Self {
        self.upstream_protected = protected;
        self
    }
}

impl Validate for CsrfpConfig {
    fn validate(&self) -> csrfp_config::Result<()> {
        ConfigValidator::not_empty(&self.token_name, "tokenName")?;
        ConfigValidator::positive(self.cookie_expiry_time, "cookieExpiryTime")?;

        if self.failed_auth_action.uses(FailureAction::Redirect) {
            ConfigValidator::not_empty(
                self.error_redirection_page.as_deref().unwrap_or_default(),
                "errorRedirectionPage",
            )?;
        }

        if self.failed_auth_action.uses(FailureAction::CustomMessage)
            && self.custom_error_message.is_none()
        {
            return Err(ConfigError::ValidationError(
                "customErrorMessage is required when an action code is 3".to_string(),
            ));
        }

        UrlAllowlist::new(&self.verify_get_for)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(())
    }
}
