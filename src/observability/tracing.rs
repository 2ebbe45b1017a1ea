//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests
//! - Propagate trace context to outbound requests
//! - Correlate log lines with the active trace
//!
//! # Design Decisions
//! - Spans are `tracing` spans bridged to OpenTelemetry by `tracing-opentelemetry`
//! - W3C Trace Context headers (`traceparent`, `tracestate`)
//! - Span status is set through the `otel.status_code` / `otel.status_message` fields

use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector};
use opentelemetry::trace::{TraceContextExt, TraceId};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Writes propagation fields into an HTTP header map.
pub struct HeaderInjector<'a>(pub &'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

/// Reads propagation fields from an HTTP header map.
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// Trace id of `span`, if it belongs to a sampled OpenTelemetry trace.
pub fn trace_id(span: &Span) -> Option<TraceId> {
    let trace_id = span.context().span().span_context().trace_id();
    (trace_id != TraceId::INVALID).then_some(trace_id)
}

/// Fill the `trace_id` field declared on `span` so every log line emitted
/// inside it carries the trace id.
pub fn record_trace_id(span: &Span) {
    if let Some(trace_id) = trace_id(span) {
        span.record("trace_id", tracing::field::display(trace_id));
    }
}

/// Mark `span` as failed. The span must declare `otel.status_code` and
/// `otel.status_message` as empty fields.
pub fn mark_error(span: &Span, message: &str) {
    span.record("otel.status_code", "ERROR");
    span.record("otel.status_message", message);
}
