use crate::error::{CsrfpError, Result};
use csrfp_core::HttpRequest;
use regex::Regex;

/// Glob patterns naming the URLs whose GET requests must carry a token.
///
/// `*` matches any run of characters; everything else is literal. A pattern
/// matches when it occurs anywhere in the URL, so `example.com/admin/*`
/// also covers `https://example.com/admin/users`.
#[derive(Debug, Clone)]
pub struct UrlAllowlist {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl UrlAllowlist {
    /// Compile a pattern list; fails on the first pattern that does not
    /// compile.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        let mut sources = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| {
                CsrfpError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                }
            })?;
            compiled.push(regex);
            sources.push(pattern.to_string());
        }

        Ok(Self {
            patterns: sources,
            compiled,
        })
    }

    /// No pattern: GET is never validated.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            compiled: Vec::new(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn requires_get_validation(&self, url: &str) -> bool {
        self.compiled.iter().any(|regex| regex.is_match(url))
    }
}

impl Default for UrlAllowlist {
    fn default() -> Self {
        Self::empty()
    }
}

/// Translate a glob into a regex with every non-`*` character escaped.
pub fn glob_to_regex(pattern: &str) -> String {
    pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

/// Scheme, host and path of the request, without the query string.
///
/// The scheme comes from `X-Forwarded-Proto` when a proxy set it, else from
/// the TLS flag.
pub fn current_url(request: &HttpRequest) -> String {
    let scheme = request
        .header("X-Forwarded-Proto")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| {
            let scheme = if request.tls { "https" } else { "http" };
            scheme.to_string()
        });

    let host = request.header("Host").map(String::as_str).unwrap_or_default();

    format!("{}://{}{}", scheme, host, request.path)
}
