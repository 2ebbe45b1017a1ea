//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Root configuration for the demo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Resource descriptor attached to all emitted telemetry.
    pub service: ServiceInfo,

    /// Exporter, logging and scrape endpoint settings.
    pub telemetry: TelemetryConfig,

    /// Outbound call made by `/api/items`.
    pub upstream: UpstreamConfig,

    /// Simulated latency and failure knobs.
    pub simulation: SimulationConfig,

    /// Background emitter settings.
    pub emitter: EmitterConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Static service metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceInfo {
    /// Value of the `service.name` resource attribute.
    pub name: String,

    /// Value of the `service.version` resource attribute.
    pub version: String,

    /// Value of the `deployment.environment` resource attribute.
    pub environment: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: "grafana-lgtm-test".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "local-test".to_string(),
        }
    }
}

/// Console/file log encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Export traces and metrics over OTLP.
    pub otlp_enabled: bool,

    /// OTLP/gRPC collector endpoint.
    pub otlp_endpoint: String,

    /// Metric export interval in seconds.
    pub export_interval_secs: u64,

    /// Per-export timeout in seconds.
    pub export_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Log line encoding.
    pub log_format: LogFormat,

    /// Optional log file, written in addition to the console.
    pub log_file: Option<String>,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Prometheus scrape endpoint bind address.
    pub metrics_address: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_enabled: true,
            otlp_endpoint: "http://localhost:4317".to_string(),
            export_interval_secs: 5,
            export_timeout_secs: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            log_file: Some("./tmp/app_logs/app.log".to_string()),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Third-party endpoint fetched by `/api/items`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Absolute http(s) URL.
    pub url: String,

    /// Total request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://jsonplaceholder.typicode.com/posts/1".to_string(),
            timeout_secs: 5,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Inclusive millisecond range a simulated delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Draw a uniform delay. Callers must not hold `rng` across an await.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return Duration::from_millis(self.min);
        }
        Duration::from_millis(rng.gen_range(self.min..=self.max))
    }
}

/// Latency and failure injection for the endpoint handlers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated work in `GET /`.
    pub home_delay_ms: DelayRange,

    /// Simulated database query in `GET /api/users`.
    pub db_delay_ms: DelayRange,

    /// Simulated processing after the outbound call in `GET /api/items`.
    pub items_delay_ms: DelayRange,

    /// Chance that the simulated query fails, in [0, 1].
    pub db_error_probability: f64,

    /// `/api/items` durations above this are logged at warn.
    pub slow_items_threshold_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            home_delay_ms: DelayRange::new(10, 50),
            db_delay_ms: DelayRange::new(50, 200),
            items_delay_ms: DelayRange::new(30, 300),
            db_error_probability: 0.1,
            slow_items_threshold_ms: 200,
        }
    }
}

impl SimulationConfig {
    pub fn slow_items_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_items_threshold_ms)
    }
}

const MIB: u64 = 1024 * 1024;

/// Background emitter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Start the emitter at launch.
    pub enabled: bool,

    /// Period between iterations in seconds.
    pub interval_secs: u64,

    /// Value of the `component` label on the memory gauge.
    pub component: String,

    /// Lower bound of the reported memory usage.
    pub memory_min_bytes: u64,

    /// Upper bound of the reported memory usage.
    pub memory_max_bytes: u64,

    /// Largest absolute gauge adjustment per iteration.
    pub max_delta_bytes: u64,

    /// Relative weight of info-level lines.
    pub info_weight: u32,

    /// Relative weight of warn-level lines.
    pub warn_weight: u32,

    /// Relative weight of error-level lines.
    pub error_weight: u32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 2,
            component: "app_server".to_string(),
            memory_min_bytes: 50 * MIB,
            memory_max_bytes: 200 * MIB,
            max_delta_bytes: 10 * MIB,
            info_weight: 70,
            warn_weight: 20,
            error_weight: 10,
        }
    }
}

impl EmitterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
