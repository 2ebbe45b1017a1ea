//! Process telemetry context.
//!
//! Owns the tracer and meter providers, the metric instruments and the
//! trace-context propagator. Built once at startup and shared through
//! `Arc<Telemetry>` with the HTTP handlers and the background emitter.

use std::time::Duration;

use axum::http::HeaderMap;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::{Context, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ServiceInfo, TelemetryConfig};
use crate::observability::metrics::Instruments;
use crate::observability::tracing::{HeaderExtractor, HeaderInjector};

/// Instrumentation scope name for tracers and meters.
pub const INSTRUMENTATION_NAME: &str = env!("CARGO_PKG_NAME");

/// Errors raised while wiring or tearing down exporters.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build {signal} exporter: {reason}")]
    Exporter { signal: &'static str, reason: String },

    #[error("failed to shut down {signal} provider: {reason}")]
    Shutdown { signal: &'static str, reason: String },
}

/// Tracer/meter handles for the lifetime of the process.
pub struct Telemetry {
    service: ServiceInfo,
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    instruments: Instruments,
    propagator: TraceContextPropagator,
}

/// Resource descriptor attached to every span and metric.
pub fn resource(service: &ServiceInfo) -> Resource {
    Resource::builder()
        .with_service_name(service.name.clone())
        .with_attributes([
            KeyValue::new("service.version", service.version.clone()),
            KeyValue::new("deployment.environment", service.environment.clone()),
            KeyValue::new("service.instance.id", Uuid::new_v4().to_string()),
        ])
        .build()
}

impl Telemetry {
    /// Wire OTLP/gRPC trace and metric exporters to the collector, or build
    /// an exporter-less context when `otlp_enabled` is off.
    ///
    /// Exports run on the SDK's own workers; an unreachable collector only
    /// produces export failures there, never in request handling.
    pub fn init(service: &ServiceInfo, config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        if !config.otlp_enabled {
            return Ok(Self::disabled(service));
        }

        let resource = resource(service);
        let timeout = Duration::from_secs(config.export_timeout_secs);

        let span_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(config.otlp_endpoint.clone())
            .with_timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::Exporter {
                signal: "trace",
                reason: e.to_string(),
            })?;
        let tracer_provider = SdkTracerProvider::builder()
            .with_resource(resource.clone())
            .with_batch_exporter(span_exporter)
            .build();

        let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(config.otlp_endpoint.clone())
            .with_timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::Exporter {
                signal: "metric",
                reason: e.to_string(),
            })?;
        let reader = PeriodicReader::builder(metric_exporter)
            .with_interval(Duration::from_secs(config.export_interval_secs))
            .build();
        let meter_provider = SdkMeterProvider::builder()
            .with_resource(resource)
            .with_reader(reader)
            .build();

        Ok(Self::from_providers(service, tracer_provider, meter_provider))
    }

    /// Context without exporters. Spans and instruments still work locally.
    pub fn disabled(service: &ServiceInfo) -> Self {
        let resource = resource(service);
        Self::from_providers(
            service,
            SdkTracerProvider::builder().with_resource(resource.clone()).build(),
            SdkMeterProvider::builder().with_resource(resource).build(),
        )
    }

    /// Context over caller-built providers.
    pub fn from_providers(
        service: &ServiceInfo,
        tracer_provider: SdkTracerProvider,
        meter_provider: SdkMeterProvider,
    ) -> Self {
        let meter = meter_provider.meter(INSTRUMENTATION_NAME);
        let instruments = Instruments::new(&meter);

        Self {
            service: service.clone(),
            tracer_provider,
            meter_provider,
            instruments,
            propagator: TraceContextPropagator::new(),
        }
    }

    pub fn service(&self) -> &ServiceInfo {
        &self.service
    }

    pub fn tracer_provider(&self) -> &SdkTracerProvider {
        &self.tracer_provider
    }

    pub fn instruments(&self) -> &Instruments {
        &self.instruments
    }

    /// Write `traceparent`/`tracestate` for `cx` into outbound headers.
    pub fn inject_context(&self, cx: &Context, headers: &mut HeaderMap) {
        self.propagator.inject_context(cx, &mut HeaderInjector(headers));
    }

    /// Read the remote parent context from inbound headers.
    pub fn extract_context(&self, headers: &HeaderMap) -> Context {
        self.propagator.extract(&HeaderExtractor(headers))
    }

    /// Flush pending exports and stop both providers. Blocks until done.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        let traces = self.tracer_provider.shutdown().map_err(|e| TelemetryError::Shutdown {
            signal: "trace",
            reason: e.to_string(),
        });
        let metrics = self.meter_provider.shutdown().map_err(|e| TelemetryError::Shutdown {
            signal: "metric",
            reason: e.to_string(),
        });
        traces?;
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

    #[test]
    fn test_resource_carries_service_identity() {
        let service = ServiceInfo {
            name: "checkout".into(),
            version: "1.2.3".into(),
            environment: "staging".into(),
        };
        let resource = resource(&service);

        let get = |key: &'static str| {
            resource
                .get(&opentelemetry::Key::from_static_str(key))
                .map(|v| v.to_string())
        };
        assert_eq!(get("service.name").as_deref(), Some("checkout"));
        assert_eq!(get("service.version").as_deref(), Some("1.2.3"));
        assert_eq!(get("deployment.environment").as_deref(), Some("staging"));
        assert!(get("service.instance.id").is_some());
    }

    #[test]
    fn test_init_without_otlp_needs_no_collector() {
        let config = TelemetryConfig {
            otlp_enabled: false,
            otlp_endpoint: "not a url".into(),
            ..TelemetryConfig::default()
        };
        let telemetry = Telemetry::init(&ServiceInfo::default(), &config).unwrap();
        assert_eq!(telemetry.service().name, "grafana-lgtm-test");
    }

    #[test]
    fn test_context_round_trips_through_headers() {
        let telemetry = Telemetry::disabled(&ServiceInfo::default());
        let span_context = SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        let cx = Context::new().with_remote_span_context(span_context.clone());

        let mut headers = HeaderMap::new();
        telemetry.inject_context(&cx, &mut headers);
        assert_eq!(
            headers.get("traceparent").unwrap(),
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
        );

        let extracted = telemetry.extract_context(&headers);
        assert_eq!(extracted.span().span_context().trace_id(), span_context.trace_id());
        assert!(extracted.span().span_context().is_remote());
    }
}
