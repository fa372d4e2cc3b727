//! Prometheus metrics
//!
//! Metrics are recorded through the `metrics` facade. When `METRICS_ADDR` is
//! configured a Prometheus exporter serves them on that address, separate
//! from the public listener so the edge never routes to it.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

/// Initialize metrics (call once at startup)
pub fn init_metrics(addr: Option<&str>) -> Result<()> {
    if let Some(addr) = addr {
        let addr: SocketAddr = addr.parse().context("Invalid METRICS_ADDR")?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!(address = %addr, "Prometheus exporter listening");
    }

    register_metrics();
    Ok(())
}

/// Register all custom metrics
fn register_metrics() {
    metrics::describe_counter!(
        "sandbox_edge_requests_total",
        "Total number of requests processed"
    );
    metrics::describe_histogram!(
        "sandbox_edge_request_duration_seconds",
        "Request duration in seconds"
    );
    metrics::describe_counter!(
        "sandbox_edge_upstream_errors_total",
        "Backend calls that produced no response"
    );
}

/// Record a request
pub fn record_request(route: &'static str, status: u16, duration_secs: f64) {
    metrics::counter!(
        "sandbox_edge_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("sandbox_edge_request_duration_seconds", "route" => route)
        .record(duration_secs);
}

/// Record a failed backend call
pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("sandbox_edge_upstream_errors_total", "kind" => kind).increment(1);
}
