//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the service metrics (request count, latency, memory gauge)
//! - Record through OpenTelemetry instruments for OTLP push
//! - Mirror into the `metrics` facade for the optional Prometheus scrape endpoint
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by endpoint, method, status
//! - `http_request_duration_seconds` (histogram): handler latency by endpoint
//! - `process_memory_usage` (up/down counter): simulated memory by component
//!
//! # Design Decisions
//! - Instrument identities are created once, at startup, and never change shape
//! - Low-overhead metric updates (atomic operations)

use std::net::SocketAddr;
use std::time::Duration;

use metrics::Unit;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use opentelemetry::metrics::{Counter, Histogram, Meter, UpDownCounter};
use opentelemetry::KeyValue;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const PROCESS_MEMORY_USAGE: &str = "process_memory_usage";

const REQUESTS_TOTAL_HELP: &str = "Total number of HTTP requests";
const REQUEST_DURATION_HELP: &str = "HTTP request duration in seconds";
const PROCESS_MEMORY_HELP: &str = "Memory usage of the process";

/// Instrumented handler, used as the `endpoint` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Home,
    Users,
    Items,
    Error,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Home => "home",
            Endpoint::Users => "users",
            Endpoint::Items => "items",
            Endpoint::Error => "error",
        }
    }
}

/// The three service instruments.
#[derive(Clone)]
pub struct Instruments {
    requests: Counter<u64>,
    duration: Histogram<f64>,
    memory: UpDownCounter<i64>,
}

impl Instruments {
    pub fn new(meter: &Meter) -> Self {
        let requests = meter
            .u64_counter(REQUESTS_TOTAL)
            .with_description(REQUESTS_TOTAL_HELP)
            .with_unit("1")
            .build();
        let duration = meter
            .f64_histogram(REQUEST_DURATION_SECONDS)
            .with_description(REQUEST_DURATION_HELP)
            .with_unit("s")
            .build();
        let memory = meter
            .i64_up_down_counter(PROCESS_MEMORY_USAGE)
            .with_description(PROCESS_MEMORY_HELP)
            .with_unit("bytes")
            .build();

        Self {
            requests,
            duration,
            memory,
        }
    }

    /// Count one served request. `status` is only set on the error route.
    pub fn record_request(&self, endpoint: Endpoint, method: &'static str, status: Option<&'static str>) {
        let endpoint = endpoint.as_str();
        match status {
            Some(status) => {
                self.requests.add(
                    1,
                    &[
                        KeyValue::new("endpoint", endpoint),
                        KeyValue::new("method", method),
                        KeyValue::new("status", status),
                    ],
                );
                metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "method" => method, "status" => status)
                    .increment(1);
            }
            None => {
                self.requests.add(
                    1,
                    &[KeyValue::new("endpoint", endpoint), KeyValue::new("method", method)],
                );
                metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "method" => method).increment(1);
            }
        }
    }

    /// Record one handler duration sample.
    pub fn record_duration(&self, endpoint: Endpoint, elapsed: Duration) {
        let endpoint = endpoint.as_str();
        let secs = elapsed.as_secs_f64();
        self.duration.record(secs, &[KeyValue::new("endpoint", endpoint)]);
        metrics::histogram!(REQUEST_DURATION_SECONDS, "endpoint" => endpoint).record(secs);
    }

    /// Apply a signed delta to the memory gauge.
    pub fn adjust_memory(&self, component: &str, delta_bytes: i64) {
        self.memory
            .add(delta_bytes, &[KeyValue::new("component", component.to_string())]);
        metrics::gauge!(PROCESS_MEMORY_USAGE, "component" => component.to_string())
            .increment(delta_bytes as f64);
    }
}

/// Register units and help text with the `metrics` recorder.
pub fn describe() {
    metrics::describe_counter!(REQUESTS_TOTAL, Unit::Count, REQUESTS_TOTAL_HELP);
    metrics::describe_histogram!(REQUEST_DURATION_SECONDS, Unit::Seconds, REQUEST_DURATION_HELP);
    metrics::describe_gauge!(PROCESS_MEMORY_USAGE, Unit::Bytes, PROCESS_MEMORY_HELP);
}

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();
    tracing::info!(address = %addr, "Prometheus metrics exporter started");
    Ok(())
}
