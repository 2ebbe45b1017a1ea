//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber once per process
//! - Write to the console and, optionally, an append-only log file
//! - Bridge spans into OpenTelemetry for trace export
//!
//! # Design Decisions
//! - JSON format for machine parsing, text for development
//! - Log level from config, overridden by `RUST_LOG`
//! - File output never carries ANSI escapes

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracer;
use thiserror::Error;
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, TelemetryConfig};
use crate::observability::telemetry::{Telemetry, INSTRUMENTATION_NAME};

/// Crates whose debug output drowns the demo's own lines.
const QUIET_TARGETS: &str = "h2=warn,hyper_util=warn,tonic=warn,tower=warn,opentelemetry_sdk=warn";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level directive: {0}")]
    Filter(#[from] ParseError),

    #[error("failed to open log file: {0}")]
    File(#[from] io::Error),

    #[error("logging already initialized: {0}")]
    Init(#[from] TryInitError),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Build the filter: `RUST_LOG` when set, else `log_level` plus quiet targets.
pub fn env_filter(log_level: &str) -> Result<EnvFilter, ParseError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(format!("{log_level},{QUIET_TARGETS}")),
    }
}

/// Bridge `tracing` spans into the context's tracer.
///
/// `error!` events do not touch span status; spans fail only through
/// [`mark_error`](crate::observability::tracing::mark_error).
pub fn otel_layer<S>(telemetry: &Telemetry) -> OpenTelemetryLayer<S, SdkTracer>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_opentelemetry::layer()
        .with_tracer(telemetry.tracer_provider().tracer(INSTRUMENTATION_NAME))
        .with_error_events_to_status(false)
}

/// Open (creating parents as needed) the log file in append mode.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber: console + optional file + OpenTelemetry bridge.
pub fn init_logging(config: &TelemetryConfig, telemetry: &Telemetry) -> Result<(), LoggingError> {
    let filter = env_filter(&config.log_level)?;
    let mut layers: Vec<BoxedLayer> = vec![otel_layer(telemetry).boxed()];

    layers.push(match config.log_format {
        LogFormat::Text => fmt::layer().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    });

    if let Some(path) = &config.log_file {
        let writer = Mutex::new(open_log_file(Path::new(path))?);
        layers.push(match config.log_format {
            LogFormat::Text => fmt::layer().with_ansi(false).with_writer(writer).boxed(),
            LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        });
    }

    tracing_subscriber::registry().with(layers).with(filter).try_init()?;
    Ok(())
}
