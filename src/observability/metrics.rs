//! Metrics collection and exposition.
//!
//! # Metrics
//! - `soap_proxy_requests_total` (counter): inbound requests by kind, status
//! - `soap_proxy_request_duration_seconds` (histogram): end-to-end latency by kind
//! - `soap_proxy_wsdl_cache_total` (counter): cache lookups by result
//! - `soap_proxy_upstream_calls_total` (counter): upstream calls by status or transport error
//! - `soap_proxy_pool_events_total` (counter): pool reuse, store, eviction
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished inbound request.
pub fn record_request(kind: &'static str, status: u16, start: Instant) {
    counter!("soap_proxy_requests_total", "kind" => kind, "status" => status.to_string()).increment(1);
    histogram!("soap_proxy_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

/// Record a WSDL cache lookup (`hit`, `miss`, `expired`).
pub fn record_cache_lookup(result: &'static str) {
    counter!("soap_proxy_wsdl_cache_total", "result" => result).increment(1);
}

/// Record an upstream call by status code or `transport_error`.
pub fn record_upstream_call(outcome: &str) {
    counter!("soap_proxy_upstream_calls_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a connection pool event.
pub fn record_pool_event(event: &'static str) {
    counter!("soap_proxy_pool_events_total", "event" => event).increment(1);
}
