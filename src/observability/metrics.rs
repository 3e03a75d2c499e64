//! Metrics collection and exposition.
//!
//! # Metrics
//! - `breaker_calls_total` (counter): guarded calls made, by operation and outcome
//! - `breaker_short_circuits_total` (counter): calls refused while open
//! - `breaker_trips_total` (counter): Closed → Open transitions
//! - `breaker_store_errors_total` (counter): store failures seen by the breaker
//! - `cache_lookups_total` (counter): cache reads, by namespace and result
//! - `cache_store_errors_total` (counter): store failures seen by the cache

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_breaker_call(operation: &str, outcome: &'static str) {
    ::metrics::counter!(
        "breaker_calls_total",
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_short_circuit(operation: &str) {
    ::metrics::counter!("breaker_short_circuits_total", "operation" => operation.to_string())
        .increment(1);
}

pub fn record_breaker_trip(operation: &str) {
    ::metrics::counter!("breaker_trips_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_breaker_store_error(operation: &str, op: &'static str) {
    ::metrics::counter!(
        "breaker_store_errors_total",
        "operation" => operation.to_string(),
        "op" => op
    )
    .increment(1);
}

/// `result` is one of `hit`, `miss`, `corrupt`, `error`.
pub fn record_cache_lookup(namespace: &str, result: &'static str) {
    ::metrics::counter!(
        "cache_lookups_total",
        "namespace" => namespace.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_cache_store_error(namespace: &str, op: &'static str) {
    ::metrics::counter!(
        "cache_store_errors_total",
        "namespace" => namespace.to_string(),
        "op" => op
    )
    .increment(1);
}
