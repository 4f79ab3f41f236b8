//! Metrics collection and exposition.
//!
//! # Metrics
//! - `secrets_requests_total` (counter): requests by method, status
//! - `secrets_request_duration_seconds` (histogram): latency distribution
//! - `secrets_rate_limited_total` (counter): requests rejected by the limiter
//! - `secrets_retrievals_total` (counter): well-formed retrievals by outcome
//! - `secrets_messages_created_total` (counter)
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    counter!(
        "secrets_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("secrets_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("secrets_rate_limited_total").increment(1);
}

pub fn record_retrieval(outcome: &'static str) {
    counter!("secrets_retrievals_total", "outcome" => outcome).increment(1);
}

pub fn record_message_created() {
    counter!("secrets_messages_created_total").increment(1);
}
