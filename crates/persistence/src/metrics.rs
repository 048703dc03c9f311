//! Storage metrics collection.
//!
//! Provides functions for recording key-value store metrics.

use metrics::histogram;
use std::time::Instant;

/// Record the duration of one key-value operation.
pub fn record_kv_duration(backend: &'static str, operation: &'static str, duration_secs: f64) {
    histogram!(
        "kv_operation_duration_seconds",
        "backend" => backend,
        "operation" => operation
    )
    .record(duration_secs);
}

/// A helper to time key-value operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = KvTimer::new("postgres", "get");
/// let result = sqlx::query_scalar::<_, String>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct KvTimer {
    backend: &'static str,
    operation: &'static str,
    start: Instant,
}

impl KvTimer {
    /// Create a new timer for the given backend and operation.
    pub fn new(backend: &'static str, operation: &'static str) -> Self {
        Self {
            backend,
            operation,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_kv_duration(self.backend, self.operation, duration);
    }
}
