//! Process-lifetime request statistics
//!
//! The aggregator is an explicitly constructed, injectable object so tests
//! can run against a fresh instance. Each completed invocation is recorded
//! exactly once, after its outcome is known; intermediate retry attempts
//! are never recorded. The whole update happens under one lock acquisition
//! to keep the counters consistent with each other.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Running counters for all requests made by this process
///
/// ## Example
///
/// ```
/// use http_request_core::stats::RequestStats;
///
/// let stats = RequestStats::new();
/// stats.record(120, Ok(200));
/// stats.record(80, Err("timeout"));
///
/// let snapshot = stats.snapshot();
/// assert_eq!(snapshot.total_requests, 2);
/// assert_eq!(snapshot.successful_requests, 1);
/// assert_eq!(snapshot.failed_requests, 1);
/// ```
#[derive(Debug, Default)]
pub struct RequestStats {
    inner: Mutex<StatsInner>,
}

#[derive(Debug)]
struct StatsInner {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    total_response_time_ms: u64,
    min_response_time_ms: u64,
    max_response_time_ms: u64,
    status_code_counts: BTreeMap<u16, u64>,
    error_counts: BTreeMap<String, u64>,
}

impl Default for StatsInner {
    fn default() -> Self {
        Self {
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            total_response_time_ms: 0,
            // Sentinel until the first record lands
            min_response_time_ms: u64::MAX,
            max_response_time_ms: 0,
            status_code_counts: BTreeMap::new(),
            error_counts: BTreeMap::new(),
        }
    }
}

/// Point-in-time copy of the counters, with derived averages
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Completed invocations, success or failure
    pub total_requests: u64,
    /// Invocations that produced an HTTP response
    pub successful_requests: u64,
    /// Invocations that ended in a terminal error
    pub failed_requests: u64,
    /// Sum of all recorded elapsed times, in milliseconds
    pub total_response_time_ms: u64,
    /// Mean elapsed time, 0.0 before the first record
    pub average_response_time_ms: f64,
    /// Fastest recorded invocation; `None` before the first record
    pub min_response_time_ms: Option<u64>,
    /// Slowest recorded invocation
    pub max_response_time_ms: u64,
    /// Responses seen, keyed by HTTP status code
    pub status_code_counts: BTreeMap<u16, u64>,
    /// Failures seen, keyed by a stable error description
    pub error_counts: BTreeMap<String, u64>,
}

impl RequestStats {
    /// Create a fresh aggregator with all counters at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed invocation.
    ///
    /// `outcome` is `Ok(status_code)` when an HTTP response was obtained
    /// (any status, including 4xx/5xx) and `Err(error_key)` when the
    /// invocation ended in a terminal error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a panic in another thread)
    #[allow(clippy::expect_used)]
    pub fn record(&self, response_time_ms: u64, outcome: Result<u16, &str>) {
        let mut inner = self
            .inner
            .lock()
            .expect("Statistics lock poisoned - indicates a panic in another thread");

        inner.total_requests += 1;
        inner.total_response_time_ms += response_time_ms;
        inner.min_response_time_ms = inner.min_response_time_ms.min(response_time_ms);
        inner.max_response_time_ms = inner.max_response_time_ms.max(response_time_ms);

        match outcome {
            Ok(status) => {
                inner.successful_requests += 1;
                *inner.status_code_counts.entry(status).or_insert(0) += 1;
            }
            Err(key) => {
                inner.failed_requests += 1;
                *inner.error_counts.entry(key.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Copy the current counters out.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a panic in another thread)
    #[must_use]
    #[allow(clippy::expect_used)]
    #[allow(clippy::cast_precision_loss)] // Counters stay far below 2^52
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self
            .inner
            .lock()
            .expect("Statistics lock poisoned - indicates a panic in another thread");

        StatsSnapshot {
            total_requests: inner.total_requests,
            successful_requests: inner.successful_requests,
            failed_requests: inner.failed_requests,
            total_response_time_ms: inner.total_response_time_ms,
            average_response_time_ms: if inner.total_requests == 0 {
                0.0
            } else {
                inner.total_response_time_ms as f64 / inner.total_requests as f64
            },
            min_response_time_ms: (inner.total_requests > 0).then_some(inner.min_response_time_ms),
            max_response_time_ms: inner.max_response_time_ms,
            status_code_counts: inner.status_code_counts.clone(),
            error_counts: inner.error_counts.clone(),
        }
    }

    /// Render the counters as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let snapshot = self.snapshot();

        if snapshot.total_requests == 0 {
            return "HTTP Request Statistics\n\nNo requests recorded yet.".to_string();
        }

        let mut out = String::from("HTTP Request Statistics\n\n");
        out.push_str(&format!("Total requests: {}\n", snapshot.total_requests));
        out.push_str(&format!("  Successful: {}\n", snapshot.successful_requests));
        out.push_str(&format!("  Failed: {}\n", snapshot.failed_requests));

        out.push_str("\nResponse times:\n");
        out.push_str(&format!(
            "  Average: {:.1}ms\n",
            snapshot.average_response_time_ms
        ));
        out.push_str(&format!(
            "  Min: {}ms\n",
            snapshot.min_response_time_ms.unwrap_or(0)
        ));
        out.push_str(&format!("  Max: {}ms\n", snapshot.max_response_time_ms));

        if !snapshot.status_code_counts.is_empty() {
            out.push_str("\nStatus codes:\n");
            for (status, count) in &snapshot.status_code_counts {
                out.push_str(&format!("  {status}: {count}\n"));
            }
        }

        if !snapshot.error_counts.is_empty() {
            out.push_str("\nErrors:\n");
            for (key, count) in &snapshot.error_counts {
                out.push_str(&format!("  {key}: {count}\n"));
            }
        }

        out.trim_end().to_string()
    }
}
