//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     telemetry.rs (resource, OTLP exporters, instruments) → Arc<Telemetry>
//!     logging.rs   (console/file subscriber + OpenTelemetry bridge)
//!     metrics.rs   (optional Prometheus scrape listener)
//!
//! Handlers and the emitter produce:
//!     → tracing spans (bridged to OTLP traces, trace_id on log lines)
//!     → Instruments (OTLP metrics, mirrored to the `metrics` facade)
//!     → tracing events (console, file)
//! ```
//!
//! # Design Decisions
//! - Tracer and meter handles live in an explicit context, not globals
//! - Export is batched/periodic on SDK workers; handlers never wait on it
//! - Request ID and trace ID flow through every log line of a request

pub mod logging;
pub mod metrics;
pub mod telemetry;
pub mod tracing;

#[cfg(test)]
pub(crate) mod testing;

pub use self::metrics::{Endpoint, Instruments};
pub use self::telemetry::{Telemetry, TelemetryError};
