//! Client metrics.
//!
//! # Metrics
//! - `proxy_client_requests_total` (counter): dispatched calls by outcome
//! - `proxy_client_request_duration_seconds` (histogram): round-trip latency
//! - `proxy_client_fail_fast_total` (counter): calls skipped by the availability gate
//! - `proxy_client_available` (gauge): 1=online, 0=in backoff
//! - `proxy_client_queue_depth` (gauge): jobs waiting in the async worker
//!
//! Without an installed recorder these calls are no-ops.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

pub fn record_request(outcome: &'static str, elapsed: Duration) {
    counter!("proxy_client_requests_total", "outcome" => outcome).increment(1);
    histogram!("proxy_client_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_fail_fast() {
    counter!("proxy_client_fail_fast_total").increment(1);
}

pub fn record_availability(available: bool) {
    gauge!("proxy_client_available").set(if available { 1.0 } else { 0.0 });
}

pub fn record_queue_depth(depth: usize) {
    gauge!("proxy_client_queue_depth").set(depth as f64);
}
