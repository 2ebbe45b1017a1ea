//! Shared fixtures for unit tests: in-memory span capture, event capture and
//! metric snapshots.

use std::fmt;
use std::sync::{Arc, Mutex};

use metrics_util::debugging::{DebugValue, Snapshotter};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::{InMemorySpanExporter, InMemorySpanExporterBuilder, SdkTracerProvider, SpanData};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::config::ServiceInfo;
use crate::observability::logging::otel_layer;
use crate::observability::Telemetry;

/// Flattened view of one metric from a debugging snapshot.
#[derive(Debug)]
pub(crate) struct MetricEntry {
    name: String,
    labels: Vec<(String, String)>,
    value: DebugValue,
}

impl MetricEntry {
    /// Find the entry with exactly this name and label set.
    pub(crate) fn find<'a>(
        entries: &'a [MetricEntry],
        name: &str,
        labels: &[(&str, &str)],
    ) -> Option<&'a MetricEntry> {
        entries.iter().find(|entry| {
            entry.name == name
                && entry.labels.len() == labels.len()
                && labels
                    .iter()
                    .all(|(k, v)| entry.labels.iter().any(|(ek, ev)| ek == k && ev == v))
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn counter(&self) -> Option<u64> {
        match self.value {
            DebugValue::Counter(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn gauge(&self) -> Option<f64> {
        match &self.value {
            DebugValue::Gauge(value) => Some(value.0),
            _ => None,
        }
    }

    pub(crate) fn histogram(&self) -> Option<Vec<f64>> {
        match &self.value {
            DebugValue::Histogram(samples) => Some(samples.iter().map(|s| s.0).collect()),
            _ => None,
        }
    }
}

pub(crate) fn metric_entries(snapshotter: &Snapshotter) -> Vec<MetricEntry> {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _unit, _description, value)| {
            let key = key.key();
            MetricEntry {
                name: key.name().to_string(),
                labels: key
                    .labels()
                    .map(|label| (label.key().to_string(), label.value().to_string()))
                    .collect(),
                value,
            }
        })
        .collect()
}

/// One `tracing` event: its level and rendered message.
#[derive(Debug, Clone)]
pub(crate) struct CapturedEvent {
    pub(crate) level: Level,
    pub(crate) message: String,
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// Layer appending every event to a shared list.
struct EventLog(Arc<Mutex<Vec<CapturedEvent>>>);

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

/// Telemetry whose spans land in memory, with a thread-local subscriber
/// bridging `tracing` spans into it and recording events for as long as the
/// capture lives.
pub(crate) struct SpanCapture {
    pub(crate) telemetry: Arc<Telemetry>,
    exporter: InMemorySpanExporter,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    _guard: DefaultGuard,
}

impl SpanCapture {
    pub(crate) fn new(service: &ServiceInfo) -> Self {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let tracer_provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let telemetry = Arc::new(Telemetry::from_providers(
            service,
            tracer_provider,
            SdkMeterProvider::builder().build(),
        ));

        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry()
            .with(otel_layer(&telemetry))
            .with(EventLog(events.clone()));
        let guard = tracing::subscriber::set_default(subscriber);

        Self {
            telemetry,
            exporter,
            events,
            _guard: guard,
        }
    }

    pub(crate) fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }

    pub(crate) fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn span<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
        spans
            .iter()
            .find(|span| span.name == name)
            .unwrap_or_else(|| panic!("no span named {name}"))
    }
}
