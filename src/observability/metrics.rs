//! Metrics collection and exposition.
//!
//! # Metrics
//! - `legacy_gateway_requests_total` (counter): inbound requests by endpoint, status
//! - `legacy_gateway_request_duration_seconds` (histogram): inbound latency by endpoint
//! - `legacy_gateway_upstream_calls_total` (counter): legacy API calls by endpoint, outcome
//! - `legacy_gateway_token_refresh_total` (counter): token fetches by reason, outcome
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "legacy_gateway_requests_total";
pub const REQUEST_DURATION: &str = "legacy_gateway_request_duration_seconds";
pub const UPSTREAM_CALLS_TOTAL: &str = "legacy_gateway_upstream_calls_total";
pub const TOKEN_REFRESH_TOTAL: &str = "legacy_gateway_token_refresh_total";

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    let result = PrometheusBuilder::new().with_http_listener(addr).install();

    match result {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Prometheus metrics endpoint started");
        }
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

fn describe() {
    metrics::describe_counter!(REQUESTS_TOTAL, "Inbound proxy requests by endpoint and status.");
    metrics::describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "Inbound proxy request latency in seconds."
    );
    metrics::describe_counter!(UPSTREAM_CALLS_TOTAL, "Calls made to the legacy API by outcome.");
    metrics::describe_counter!(TOKEN_REFRESH_TOTAL, "Legacy token fetches by reason and outcome.");
}

/// Record one completed inbound request.
pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "status" => status.to_string()).increment(1);
    metrics::histogram!(REQUEST_DURATION, "endpoint" => endpoint).record(start.elapsed().as_secs_f64());
}

/// Record one legacy API call. `outcome` is a status class or `network`.
pub fn record_upstream_call(endpoint: &'static str, outcome: &'static str) {
    metrics::counter!(UPSTREAM_CALLS_TOTAL, "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

pub fn record_token_refresh(reason: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(TOKEN_REFRESH_TOTAL, "reason" => reason, "outcome" => outcome).increment(1);
}

/// Bucket an HTTP status into the label used for upstream outcomes.
pub fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        401 => "401",
        422 => "422",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
