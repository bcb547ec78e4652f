//! Tool input: the declared request shape and its validation
//!
//! Parameters arrive as the JSON arguments of a `tools/call` and are
//! immutable for the rest of the invocation. Parsing is strict about types
//! and ranges (the declared schema) but deliberately lenient about the
//! `headers` field, which older clients send as a JSON-encoded string
//! rather than an object; a string that fails to parse degrades to "no
//! headers" instead of failing the call.

use crate::error::RequestError;
use reqwest::Method;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Per-attempt timeout bounds, in milliseconds
pub const TIMEOUT_MS_MIN: u64 = 1_000;
/// Upper bound for the per-attempt timeout
pub const TIMEOUT_MS_MAX: u64 = 300_000;
/// Upper bound for the attempt budget
pub const MAX_RETRIES_MAX: u32 = 10;
/// Initial retry delay bounds, in milliseconds
pub const RETRY_DELAY_MS_MIN: u64 = 100;
/// Upper bound for the initial retry delay
pub const RETRY_DELAY_MS_MAX: u64 = 10_000;

/// Per-attempt timeout applied when the caller specifies none
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Attempt budget applied when the caller specifies none
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Initial retry delay applied when the caller specifies none
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

fn default_method() -> String {
    "GET".to_string()
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_retry_delay() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

const fn default_follow_redirects() -> bool {
    true
}

/// Parameters for one `http_request` invocation
///
/// Field names match the tool's declared input schema (camelCase on the
/// wire). Absent fields take the schema defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParams {
    /// Target URL; must be an absolute URL with an authority
    pub url: String,

    /// HTTP verb, matched case-insensitively (default "GET")
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers; an object map, or a JSON-encoded string of one
    #[serde(default, deserialize_with = "lenient_headers")]
    pub headers: HashMap<String, String>,

    /// Optional request body; only sent for non-GET/HEAD methods
    #[serde(default)]
    pub body: Option<String>,

    /// Per-attempt timeout in milliseconds (default 30000)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Attempt budget: 0 or 1 means a single attempt (default 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial delay between attempts in milliseconds, doubled after each
    /// failure (default 1000)
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,

    /// Whether to follow HTTP redirects (default true)
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
}

impl RequestParams {
    /// Parse tool-call arguments into parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidParams`] when the arguments do not
    /// match the declared shape (missing `url`, wrong types).
    pub fn from_args(args: &serde_json::Value) -> Result<Self, RequestError> {
        serde_json::from_value(args.clone()).map_err(|e| RequestError::InvalidParams(e.to_string()))
    }

    /// Check the URL and numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] for a malformed URL and
    /// [`RequestError::InvalidParams`] for out-of-range numeric fields.
    pub fn validate(&self) -> Result<(), RequestError> {
        if !is_valid_url(&self.url) {
            return Err(RequestError::InvalidUrl(self.url.clone()));
        }

        if !(TIMEOUT_MS_MIN..=TIMEOUT_MS_MAX).contains(&self.timeout) {
            return Err(RequestError::InvalidParams(format!(
                "timeout must be between {TIMEOUT_MS_MIN} and {TIMEOUT_MS_MAX} milliseconds (got {})",
                self.timeout
            )));
        }

        if self.max_retries > MAX_RETRIES_MAX {
            return Err(RequestError::InvalidParams(format!(
                "maxRetries must be between 0 and {MAX_RETRIES_MAX} (got {})",
                self.max_retries
            )));
        }

        if !(RETRY_DELAY_MS_MIN..=RETRY_DELAY_MS_MAX).contains(&self.retry_delay) {
            return Err(RequestError::InvalidParams(format!(
                "retryDelay must be between {RETRY_DELAY_MS_MIN} and {RETRY_DELAY_MS_MAX} milliseconds (got {})",
                self.retry_delay
            )));
        }

        Ok(())
    }

    /// Effective attempt budget: `maxRetries` of 0 and 1 both mean one attempt
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        if self.max_retries == 0 { 1 } else { self.max_retries }
    }
}

/// True iff the string parses as an absolute URL with scheme and authority.
///
/// Never panics; a precondition gate, not a reachability check.
#[must_use]
pub fn is_valid_url(raw: &str) -> bool {
    url::Url::parse(raw).map(|u| u.has_host()).unwrap_or(false)
}

/// Resolve a verb string to a method, case-insensitively.
///
/// The accepted set matches the tool's declared schema.
///
/// # Errors
///
/// Returns [`RequestError::InvalidParams`] for a verb outside the set.
pub fn parse_method(raw: &str) -> Result<Method, RequestError> {
    match raw.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        "PATCH" => Ok(Method::PATCH),
        "HEAD" => Ok(Method::HEAD),
        other => Err(RequestError::InvalidParams(format!(
            "unsupported method: {other}"
        ))),
    }
}

/// Content type inferred for a body the caller did not label: a JSON parse
/// probe decides between `application/json` and `text/plain`.
pub(crate) fn infer_content_type(body: &str) -> &'static str {
    if serde_json::from_str::<serde_json::Value>(body).is_ok() {
        "application/json"
    } else {
        "text/plain"
    }
}

/// Convert a raw `headers` value into a header map, recovering locally from
/// every malformed shape: non-string entries are skipped, an unparseable
/// JSON string yields an empty map.
pub(crate) fn headers_from_value(value: &serde_json::Value) -> HashMap<String, String> {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect(),
        serde_json::Value::String(raw) => serde_json::from_str(raw).unwrap_or_default(),
        _ => HashMap::new(),
    }
}

fn lenient_headers<'de, D>(de: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(headers_from_value(&value))
}
