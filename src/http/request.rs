//! Inbound request instrumentation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and echo it on the response
//! - Open the `http_request` server span, parented on any incoming `traceparent`
//! - Record the response status on that span
//!
//! # Design Decisions
//! - Request ID added as early as possible so the server span can carry it
//! - 5xx responses mark the server span as failed

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::field::Empty;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::observability::tracing::record_trace_id;
use crate::observability::Telemetry;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Outermost layer: assign an ID to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Copy the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// The request ID header value, or "unknown".
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Server span for one inbound request.
pub fn make_server_span(telemetry: &Telemetry, request: &Request<Body>) -> Span {
    let span = tracing::info_span!(
        "http_request",
        otel.name = %format!("{} {}", request.method(), request.uri().path()),
        otel.kind = "server",
        otel.status_code = Empty,
        http.method = %request.method(),
        http.target = %request.uri(),
        http.status_code = Empty,
        request_id = %request_id(request),
        trace_id = Empty,
    );
    let _ = span.set_parent(telemetry.extract_context(request.headers()));
    record_trace_id(&span);
    span
}

/// `TraceLayer` response hook.
pub fn on_response(response: &Response<Body>, latency: Duration, span: &Span) {
    let status = response.status();
    span.record("http.status_code", status.as_u16());
    if status.is_server_error() {
        span.record("otel.status_code", "ERROR");
    }
    tracing::debug!(status = status.as_u16(), latency_ms = latency.as_millis() as u64, "Request finished");
}
