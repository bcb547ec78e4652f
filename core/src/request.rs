//! The full request pipeline behind the `http_request` tool
//!
//! Validation, retry-wrapped execution, classification, formatting, and
//! the statistics update, assembled into one entry point. Every completed
//! invocation records exactly one statistics entry, validation failures
//! included; intermediate retry attempts record nothing.

use crate::classify::classify;
use crate::error::RequestError;
use crate::executor::{HttpResponse, OutboundRequest, send_once};
use crate::format::{format_body, format_headers};
use crate::params::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS, RequestParams};
use crate::retry::run_with_retry;
use crate::stats::RequestStats;
use std::time::{Duration, Instant};

/// Result of one tool invocation, ready for the transport layer
///
/// Failure is signaled through the flag, never through a panic or an
/// unhandled error; the text is always present and human-readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    /// Display text for the calling agent
    pub text: String,
    /// True when the invocation ended in a terminal error
    pub is_error: bool,
}

struct Success {
    response: HttpResponse,
    attempts: u32,
    max_attempts: u32,
}

struct FailureContext {
    error: RequestError,
    attempts: u32,
    max_attempts: u32,
    timeout_ms: u64,
    method: String,
    url: String,
}

impl FailureContext {
    /// Failure before any attempt was made. Parameters may be partially
    /// known; diagnostics fall back to the raw arguments and schema
    /// defaults.
    fn before_send(
        args: &serde_json::Value,
        params: Option<&RequestParams>,
        error: RequestError,
    ) -> Self {
        let (max_attempts, timeout_ms) = params.map_or(
            (DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS),
            |p| (p.max_attempts(), p.timeout),
        );
        let method = params.map_or_else(
            || {
                args.get("method")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("GET")
                    .to_ascii_uppercase()
            },
            |p| p.method.to_ascii_uppercase(),
        );
        let url = params.map_or_else(
            || {
                args.get("url")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("<missing>")
                    .to_string()
            },
            |p| p.url.clone(),
        );

        Self {
            error,
            attempts: 0,
            max_attempts,
            timeout_ms,
            method,
            url,
        }
    }
}

/// Run one `http_request` invocation end to end.
///
/// Parses and validates the arguments, derives the outbound request, runs
/// it under the retry coordinator, classifies and formats the response,
/// and records the outcome in `stats`. Never fails: both outcomes come
/// back as a [`ToolOutcome`] with the error flag set appropriately.
///
/// ## Example
///
/// ```ignore
/// let stats = RequestStats::new();
/// let outcome = execute(&json!({ "url": "https://example.com/" }), &stats).await;
/// assert!(!outcome.is_error);
/// ```
pub async fn execute(args: &serde_json::Value, stats: &RequestStats) -> ToolOutcome {
    let started = Instant::now();
    let result = run_pipeline(args).await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(success) => {
            stats.record(elapsed_ms, Ok(success.response.status_code));
            tracing::info!(
                status = success.response.status_code,
                elapsed_ms,
                attempts = success.attempts,
                "request completed"
            );
            ToolOutcome {
                text: render_success(&success, elapsed_ms),
                is_error: false,
            }
        }
        Err(failure) => {
            stats.record(elapsed_ms, Err(failure.error.stat_key()));
            tracing::warn!(error = %failure.error, elapsed_ms, "request failed");
            ToolOutcome {
                text: render_failure(&failure, elapsed_ms),
                is_error: true,
            }
        }
    }
}

async fn run_pipeline(args: &serde_json::Value) -> Result<Success, FailureContext> {
    let params = match RequestParams::from_args(args) {
        Ok(params) => params,
        Err(error) => return Err(FailureContext::before_send(args, None, error)),
    };
    if let Err(error) = params.validate() {
        return Err(FailureContext::before_send(args, Some(&params), error));
    }
    let request = match OutboundRequest::derive(&params) {
        Ok(request) => request,
        Err(error) => return Err(FailureContext::before_send(args, Some(&params), error)),
    };

    let retry_delay = Duration::from_millis(params.retry_delay);
    match run_with_retry(params.max_retries, retry_delay, || {
        send_once(&request, params.timeout)
    })
    .await
    {
        Ok((response, attempts)) => Ok(Success {
            response,
            attempts,
            max_attempts: params.max_attempts(),
        }),
        Err(error) => {
            let attempts = match &error {
                RequestError::RetriesExhausted { attempts, .. } => *attempts,
                _ => 1,
            };
            Err(FailureContext {
                error,
                attempts,
                max_attempts: params.max_attempts(),
                timeout_ms: params.timeout,
                method: request.method.to_string(),
                url: params.url,
            })
        }
    }
}

fn render_success(success: &Success, elapsed_ms: u64) -> String {
    let response = &success.response;
    let kind = classify(response.content_type(), &response.body_text);

    let status_line = if response.status_text.is_empty() {
        format!("HTTP {}", response.status_code)
    } else {
        format!("HTTP {} {}", response.status_code, response.status_text)
    };

    format!(
        "{status_line}\n\
         Time: {elapsed_ms}ms | Type: {kind} | Size: {size} chars | Attempt: {attempts}/{max}\n\
         \n\
         Headers:\n{headers}\n\
         \n\
         Body:\n{body}",
        size = response.body_text.chars().count(),
        attempts = success.attempts,
        max = success.max_attempts,
        headers = format_headers(&response.headers),
        body = format_body(kind, &response.body_text),
    )
}

fn render_failure(failure: &FailureContext, elapsed_ms: u64) -> String {
    format!(
        "Request failed: {error}\n\
         Time: {elapsed_ms}ms | Attempts: {attempts}/{max} | Timeout: {timeout}ms\n\
         {method} {url}",
        error = failure.error,
        attempts = failure.attempts,
        max = failure.max_attempts,
        timeout = failure.timeout_ms,
        method = failure.method,
        url = failure.url,
    )
}
