//! Metrics collection and exposition.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize metrics exporter and server.
pub fn init_metrics(addr: SocketAddr) {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus recorder");

    tracing::info!("Metrics server listening on http://{}", addr);
}

/// Helper to record an accepted request by method.
pub fn record_request(method: &str) {
    let labels = [("method", method.to_string())];

    counter!("proxy_requests_total", &labels).increment(1);
}

/// Helper to record an error response generated by the proxy itself.
pub fn record_client_error(status: u16) {
    let labels = [("status", status.to_string())];

    counter!("proxy_client_errors_total", &labels).increment(1);
}

/// Record a cache lookup that found an entry.
pub fn record_cache_hit() {
    counter!("proxy_cache_hits_total").increment(1);
}

/// Record a cache lookup that found nothing.
pub fn record_cache_miss() {
    counter!("proxy_cache_misses_total").increment(1);
}

/// Record a successful cache insertion.
pub fn record_cache_insert() {
    counter!("proxy_cache_insertions_total").increment(1);
}

/// Record an entry pushed out to make room.
pub fn record_cache_eviction() {
    counter!("proxy_cache_evictions_total").increment(1);
}

/// Update the resident-bytes gauge after an insertion.
pub fn record_cache_bytes(bytes: usize) {
    gauge!("proxy_cache_resident_bytes").set(bytes as f64);
}
