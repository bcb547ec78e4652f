//! Timed request execution
//!
//! One outbound attempt: derive the wire request from the validated
//! parameters, send it under a deadline, read the body with a size guard.
//! When the deadline fires the in-flight future is dropped, which cancels
//! the underlying connection. No state is shared between attempts, so
//! independent invocations can run concurrently.

use crate::error::RequestError;
use crate::params::{self, RequestParams};
use futures::StreamExt;
use reqwest::Method;
use std::collections::BTreeMap;
use std::time::Duration;

/// Maximum response size (50MB)
const MAX_RESPONSE_SIZE: usize = 50 * 1024 * 1024;

/// One attempt's outbound request, derived from validated parameters
///
/// Built once per invocation and reused unchanged across retry attempts.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// Resolved verb
    pub method: Method,
    /// Target URL as received
    pub url: String,
    /// Caller headers, plus an inferred Content-Type when needed
    pub headers: std::collections::HashMap<String, String>,
    /// Body, attached only for verbs that carry one
    pub body: Option<String>,
    /// Whether redirects are followed for this invocation
    pub follow_redirects: bool,
}

impl OutboundRequest {
    /// Derive the wire request from the validated parameters.
    ///
    /// The verb is resolved case-insensitively. GET and HEAD never carry a
    /// body. When a body is present and the caller declared no
    /// Content-Type, one is inferred from the body text.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidParams`] for a verb outside the
    /// supported set.
    pub fn derive(params: &RequestParams) -> Result<Self, RequestError> {
        let method = params::parse_method(&params.method)?;
        let mut headers = params.headers.clone();

        let body = if method == Method::GET || method == Method::HEAD {
            None
        } else {
            params.body.clone()
        };

        if let Some(body_text) = &body {
            let declared = headers
                .keys()
                .any(|k| k.eq_ignore_ascii_case("content-type"));
            if !declared {
                headers.insert(
                    "Content-Type".to_string(),
                    params::infer_content_type(body_text).to_string(),
                );
            }
        }

        Ok(Self {
            method,
            url: params.url.clone(),
            headers,
            body,
            follow_redirects: params.follow_redirects,
        })
    }
}

/// Response captured from one completed attempt
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Numeric status code
    pub status_code: u16,
    /// Canonical reason phrase, empty when the status has none
    pub status_text: String,
    /// Response headers, names lowercased, values decoded lossily
    pub headers: BTreeMap<String, String>,
    /// Body decoded as UTF-8, lossily
    pub body_text: String,
}

impl HttpResponse {
    /// Declared content type, if the response carried one
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// Issue one attempt, bounded by `timeout_ms`.
///
/// The deadline covers the connection, the send, and the full body read.
///
/// # Errors
///
/// Returns [`RequestError::Timeout`] when the deadline fires first,
/// [`RequestError::InvalidParams`] when the request cannot be constructed
/// (bad header characters, unsupported scheme), and
/// [`RequestError::Network`] for transport failures and oversized bodies.
pub async fn send_once(
    request: &OutboundRequest,
    timeout_ms: u64,
) -> Result<HttpResponse, RequestError> {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), perform(request)).await {
        Ok(result) => result,
        Err(_) => Err(RequestError::Timeout { timeout_ms }),
    }
}

async fn perform(request: &OutboundRequest) -> Result<HttpResponse, RequestError> {
    let redirect = if request.follow_redirects {
        reqwest::redirect::Policy::default()
    } else {
        reqwest::redirect::Policy::none()
    };
    let client = reqwest::Client::builder()
        .redirect(redirect)
        .build()
        .map_err(|e| RequestError::Network(e.to_string()))?;

    let mut builder = client.request(request.method.clone(), &request.url);
    for (key, value) in &request.headers {
        builder = builder.header(key, value);
    }
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }

    tracing::debug!(method = %request.method, url = %request.url, "sending request");

    let response = builder.send().await.map_err(|e| {
        if e.is_builder() {
            RequestError::InvalidParams(e.to_string())
        } else {
            RequestError::Network(e.to_string())
        }
    })?;

    let status_code = response.status().as_u16();
    let status_text = response
        .status()
        .canonical_reason()
        .unwrap_or("")
        .to_string();
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                v.to_str().unwrap_or("<invalid>").to_string(),
            )
        })
        .collect();

    // Stream response with size limit
    let mut body_bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| RequestError::Network(format!("failed to read response: {e}")))?;

        if body_bytes.len() + chunk.len() > MAX_RESPONSE_SIZE {
            return Err(RequestError::Network(format!(
                "response too large (>{MAX_RESPONSE_SIZE} bytes)"
            )));
        }

        body_bytes.extend_from_slice(&chunk);
    }

    let body_text = String::from_utf8_lossy(&body_bytes).to_string();

    Ok(HttpResponse {
        status_code,
        status_text,
        headers,
        body_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(args: serde_json::Value) -> RequestParams {
        RequestParams::from_args(&args).expect("test args should parse")
    }

    #[test]
    fn test_derive_resolves_method_case_insensitively() {
        let request = OutboundRequest::derive(&params(json!({
            "url": "https://example.com/",
            "method": "post"
        })))
        .expect("derive should succeed");

        assert_eq!(request.method, Method::POST);
    }

    #[test]
    fn test_derive_rejects_unsupported_method() {
        let err = OutboundRequest::derive(&params(json!({
            "url": "https://example.com/",
            "method": "TRACE"
        })))
        .expect_err("TRACE is not supported");

        assert!(matches!(err, RequestError::InvalidParams(_)));
    }

    #[test]
    fn test_derive_infers_json_content_type() {
        let request = OutboundRequest::derive(&params(json!({
            "url": "https://example.com/",
            "method": "POST",
            "body": "{\"a\":1}"
        })))
        .expect("derive should succeed");

        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.body.as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_derive_infers_text_content_type_for_non_json_body() {
        let request = OutboundRequest::derive(&params(json!({
            "url": "https://example.com/",
            "method": "PUT",
            "body": "hello there"
        })))
        .expect("derive should succeed");

        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("text/plain")
        );
    }

    #[test]
    fn test_derive_keeps_declared_content_type() {
        let request = OutboundRequest::derive(&params(json!({
            "url": "https://example.com/",
            "method": "POST",
            "headers": { "content-type": "application/xml" },
            "body": "<a/>"
        })))
        .expect("derive should succeed");

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers["content-type"], "application/xml");
    }

    #[test]
    fn test_derive_drops_body_for_get_and_head() {
        for method in ["GET", "HEAD"] {
            let request = OutboundRequest::derive(&params(json!({
                "url": "https://example.com/",
                "method": method,
                "body": "ignored"
            })))
            .expect("derive should succeed");

            assert_eq!(request.body, None);
            assert!(request.headers.is_empty()); // No inferred Content-Type either
        }
    }

    #[test]
    fn test_content_type_accessor() {
        let mut headers = BTreeMap::new();
        headers.insert(
            "content-type".to_string(),
            "text/html; charset=utf-8".to_string(),
        );
        let response = HttpResponse {
            status_code: 200,
            status_text: "OK".to_string(),
            headers,
            body_text: String::new(),
        };

        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
    }
}
