// HTTP request and response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The two request classes the protector distinguishes.
///
/// Every method other than `POST` is validated (if at all) as `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestType {
    Get,
    Post,
}

impl RequestType {
    /// Classify an HTTP method.
    pub fn from_method(method: &str) -> Self {
        if method.eq_ignore_ascii_case("POST") {
            RequestType::Post
        } else {
            RequestType::Get
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Get => "GET",
            RequestType::Post => "POST",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP request wrapper
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub raw_query: Option<String>,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub body_params: HashMap<String, String>,
    /// Whether the request arrived over TLS
    pub tls: bool,
}

impl HttpRequest {
    /// Create a request from a method and a request URI (`/path?query`).
    pub fn new(method: impl Into<String>, uri: impl AsRef<str>) -> Self {
        let uri = uri.as_ref();
        let (path, raw_query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri.to_string(), None),
        };

        let query_params = raw_query
            .as_deref()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .map(|pairs| pairs.into_iter().collect())
            .unwrap_or_default();

        Self {
            method: method.into(),
            path,
            raw_query,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            query_params,
            body_params: HashMap::new(),
            tls: false,
        }
    }

    pub fn request_type(&self) -> RequestType {
        RequestType::from_method(&self.method)
    }

    /// Path plus the original query string, as the client sent it.
    pub fn request_uri(&self) -> String {
        match &self.raw_query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// Get a header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Get a cookie by name
    pub fn cookie(&self, name: &str) -> Option<&String> {
        self.cookies.get(name)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Get a form body parameter by name
    pub fn body_param(&self, name: &str) -> Option<&String> {
        self.body_params.get(name)
    }

    /// The parameter set belonging to the request type: query for GET, body for POST.
    pub fn params_for(&self, request_type: RequestType) -> &HashMap<String, String> {
        match request_type {
            RequestType::Get => &self.query_params,
            RequestType::Post => &self.body_params,
        }
    }

    /// Drop every parameter of the given request type.
    pub fn clear_params(&mut self, request_type: RequestType) {
        match request_type {
            RequestType::Get => {
                self.query_params.clear();
                self.raw_query = None;
            }
            RequestType::Post => self.body_params.clear(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        if key.eq_ignore_ascii_case("cookie") {
            self.cookies.extend(parse_cookie_header(&value));
        }
        self.headers.insert(key, value);
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_body_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body_params.insert(name.into(), value.into());
        self
    }

    /// Parse an `application/x-www-form-urlencoded` body into the body parameters.
    pub fn with_form_body(mut self, body: &[u8]) -> Result<Self, crate::Error> {
        let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .map_err(|e| crate::Error::Deserialization(e.to_string()))?;
        self.body_params.extend(pairs);
        Ok(self)
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}

/// Split a `Cookie` request header into name/value pairs.
pub fn parse_cookie_header(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().trim_matches('"').to_string()))
        })
        .collect()
}

/// HTTP response wrapper
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// Rendered `Set-Cookie` values, one per cookie
    pub cookies: Vec<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            cookies: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Temporary redirect to `location`
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(302).with_header("Location", location)
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, set_cookie: impl Into<String>) -> Self {
        self.cookies.push(set_cookie.into());
        self
    }

    /// Get a header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Find the `Set-Cookie` value for the named cookie.
    pub fn cookie(&self, name: &str) -> Option<&String> {
        let prefix = format!("{}=", name);
        self.cookies.iter().find(|c| c.starts_with(&prefix))
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_type_from_method() {
        assert_eq!(RequestType::from_method("POST"), RequestType::Post);
        assert_eq!(RequestType::from_method("post"), RequestType::Post);
        assert_eq!(RequestType::from_method("GET"), RequestType::Get);
        assert_eq!(RequestType::from_method("PUT"), RequestType::Get);
        assert_eq!(RequestType::from_method("DELETE"), RequestType::Get);
    }

    #[test]
    fn test_request_splits_query() {
        let req = HttpRequest::new("GET", "/search?q=rust&page=2");
        assert_eq!(req.path, "/search");
        assert_eq!(req.query("q"), Some(&"rust".to_string()));
        assert_eq!(req.query("page"), Some(&"2".to_string()));
        assert_eq!(req.request_uri(), "/search?q=rust&page=2");
    }

    #[test]
    fn test_cookie_header_is_parsed() {
        let req = HttpRequest::new("GET", "/").with_header("Cookie", "a=1; csrfp_token=abc");
        assert_eq!(req.cookie("a"), Some(&"1".to_string()));
        assert_eq!(req.cookie("csrfp_token"), Some(&"abc".to_string()));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = HttpRequest::new("GET", "/").with_header("X-Forwarded-Proto", "https");
        assert_eq!(req.header("x-forwarded-proto"), Some(&"https".to_string()));
    }

    #[test]
    fn test_form_body() {
        let req = HttpRequest::new("POST", "/submit")
            .with_form_body(b"name=alice&csrfp_token=t1")
            .unwrap();
        assert_eq!(req.body_param("name"), Some(&"alice".to_string()));
        assert_eq!(req.body_param("csrfp_token"), Some(&"t1".to_string()));
    }

    #[test]
    fn test_clear_params() {
        let mut req = HttpRequest::new("GET", "/x?a=1").with_body_param("b", "2");
        req.clear_params(RequestType::Get);
        assert!(req.query_params.is_empty());
        assert_eq!(req.request_uri(), "/x");
        assert_eq!(req.body_params.len(), 1);

        req.clear_params(RequestType::Post);
        assert!(req.body_params.is_empty());
    }

    #[test]
    fn test_response_helpers() {
        let response = HttpResponse::redirect("/error");
        assert_eq!(response.status, 302);
        assert_eq!(response.header("location"), Some(&"/error".to_string()));

        let response = HttpResponse::ok().with_cookie("csrfp_token=abc; Path=/");
        assert!(response.cookie("csrfp_token").is_some());
        assert!(response.cookie("other").is_none());
    }
}
