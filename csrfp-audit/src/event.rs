//! Attack record structure

use chrono::{DateTime, Utc};
use csrfp_core::{HttpRequest, RequestType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One failed token validation, as written to the attack log.
///
/// Records are write-once: built when the failure is detected and appended
/// to the sink as a single JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRecord {
    /// Unique record ID
    pub id: String,

    /// When the failure was detected
    pub timestamp: DateTime<Utc>,

    /// `Host` header of the offending request
    pub host: String,

    /// Path and query string as requested
    pub request_uri: String,

    /// Which parameter set was validated
    pub request_type: RequestType,

    /// The parameters submitted with the request (query for GET, body for POST)
    pub query: BTreeMap<String, String>,

    /// Cookies present at the time of failure
    pub cookie: BTreeMap<String, String>,
}

impl AttackRecord {
    /// Create an empty record stamped with the current time.
    pub fn new(request_type: RequestType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            host: String::new(),
            request_uri: String::new(),
            request_type,
            query: BTreeMap::new(),
            cookie: BTreeMap::new(),
        }
    }

    /// Snapshot a request that failed validation.
    pub fn from_request(request: &HttpRequest, request_type: RequestType) -> Self {
        Self::new(request_type)
            .host(request.header("Host").cloned().unwrap_or_default())
            .request_uri(request.request_uri())
            .query(
                request
                    .params_for(request_type)
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            )
            .cookie(request.cookies.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = uri.into();
        self
    }

    pub fn query(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn cookie(mut self, cookies: impl IntoIterator<Item = (String, String)>) -> Self {
        self.cookie.extend(cookies);
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
