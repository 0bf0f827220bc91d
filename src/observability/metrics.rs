//! Metrics collection and exposition.
//!
//! # Metrics
//! - `httpbin_requests_total` (counter): requests by method, endpoint, status
//! - `httpbin_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Labels use the route pattern, never the raw path, to bound cardinality
//! - Histogram buckets reach past the default max duration so `/delay` fits

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

use crate::observability::observer::RequestResult;

const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Install the Prometheus recorder and start its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full("httpbin_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install()?;

    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

/// Record one completed request.
pub fn record_request(result: &RequestResult) {
    let method = result.method.to_string();
    let endpoint = result
        .endpoint
        .clone()
        .unwrap_or_else(|| "unmatched".to_string());
    let status = result.status.as_u16().to_string();

    counter!(
        "httpbin_requests_total",
        "method" => method.clone(),
        "endpoint" => endpoint.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "httpbin_request_duration_seconds",
        "method" => method,
        "endpoint" => endpoint,
        "status" => status
    )
    .record(result.duration.as_secs_f64());
}
