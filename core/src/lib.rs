//! # HTTP Request Core
//!
//! Request pipeline for the HTTP request MCP tool: validation, timed
//! execution with cancellation, bounded retry with exponential backoff,
//! response classification and formatting, and process-lifetime request
//! statistics.
//!
//! ## Components
//!
//! - **Parameters**: the declared input shape, range checks, URL validation
//! - **Executor**: one outbound attempt bounded by a deadline
//! - **Retry**: a fixed attempt budget with doubling backoff between failures
//! - **Classification**: semantic body type from the declared header or content
//! - **Formatting**: display rendering per body type
//! - **Statistics**: injectable process-lifetime counters
//! - **Pipeline**: the assembled tool operation
//!
//! All components other than the statistics aggregator are invocation-local
//! and stateless across calls; concurrent invocations share only the
//! aggregator, which serializes its updates internally.
//!
//! ## Example
//!
//! ```ignore
//! use http_request_core::{RequestStats, execute};
//! use serde_json::json;
//!
//! let stats = RequestStats::new();
//! let outcome = execute(&json!({ "url": "https://example.com/" }), &stats).await;
//! println!("{}", outcome.text);
//! ```

/// Response classification from content type and body text
pub mod classify;

/// Error taxonomy for the request pipeline
pub mod error;

/// Timed single-attempt execution
pub mod executor;

/// Display formatting for response bodies and headers
pub mod format;

/// Tool input parameters and validation
pub mod params;

/// The assembled request pipeline
pub mod request;

/// Bounded retry with exponential backoff
pub mod retry;

/// Process-lifetime request statistics
pub mod stats;

// Re-export the types most callers need
pub use classify::{ResponseKind, classify};
pub use error::RequestError;
pub use executor::{HttpResponse, OutboundRequest};
pub use params::RequestParams;
pub use request::{ToolOutcome, execute};
pub use stats::{RequestStats, StatsSnapshot};
