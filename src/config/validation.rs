//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, probabilities in [0, 1])
//! - Validate addresses and URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{DelayRange, ServiceConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: must not be empty")]
    Empty { field: &'static str },

    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange { field: &'static str, min: u64, max: u64 },

    #[error("{field}: probability {value} outside [0, 1]")]
    Probability { field: &'static str, value: f64 },

    #[error("{field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("emitter: severity weights must not all be zero")]
    NoSeverityWeight,

    #[error(
        "upstream timeout ({upstream_ms} ms) plus max items delay ({delay_ms} ms) must stay below the request timeout ({request_ms} ms)"
    )]
    ItemsExceedRequestTimeout { upstream_ms: u64, delay_ms: u64, request_ms: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_positive(&mut errors, "listener.request_timeout_secs", config.listener.request_timeout_secs);

    check_non_empty(&mut errors, "service.name", &config.service.name);
    check_non_empty(&mut errors, "service.version", &config.service.version);
    check_non_empty(&mut errors, "service.environment", &config.service.environment);

    let telemetry = &config.telemetry;
    if telemetry.otlp_enabled {
        check_url(&mut errors, "telemetry.otlp_endpoint", &telemetry.otlp_endpoint);
    }
    check_positive(&mut errors, "telemetry.export_interval_secs", telemetry.export_interval_secs);
    check_positive(&mut errors, "telemetry.export_timeout_secs", telemetry.export_timeout_secs);
    if telemetry.metrics_enabled {
        check_address(&mut errors, "telemetry.metrics_address", &telemetry.metrics_address);
    }

    check_url(&mut errors, "upstream.url", &config.upstream.url);
    check_positive(&mut errors, "upstream.timeout_secs", config.upstream.timeout_secs);

    let simulation = &config.simulation;
    check_range(&mut errors, "simulation.home_delay_ms", simulation.home_delay_ms);
    check_range(&mut errors, "simulation.db_delay_ms", simulation.db_delay_ms);
    check_range(&mut errors, "simulation.items_delay_ms", simulation.items_delay_ms);
    let p = simulation.db_error_probability;
    if !(0.0..=1.0).contains(&p) {
        errors.push(ValidationError::Probability {
            field: "simulation.db_error_probability",
            value: p,
        });
    }

    // `/api/items` must answer before the request timeout even when the
    // upstream hangs for its full timeout.
    let upstream_ms = config.upstream.timeout_secs.saturating_mul(1_000);
    let delay_ms = simulation.items_delay_ms.max;
    let request_ms = config.listener.request_timeout_secs.saturating_mul(1_000);
    if upstream_ms.saturating_add(delay_ms) >= request_ms {
        errors.push(ValidationError::ItemsExceedRequestTimeout {
            upstream_ms,
            delay_ms,
            request_ms,
        });
    }

    let emitter = &config.emitter;
    check_positive(&mut errors, "emitter.interval_secs", emitter.interval_secs);
    check_non_empty(&mut errors, "emitter.component", &emitter.component);
    check_range(
        &mut errors,
        "emitter.memory_bytes",
        DelayRange::new(emitter.memory_min_bytes, emitter.memory_max_bytes),
    );
    let total_weight =
        u64::from(emitter.info_weight) + u64::from(emitter.warn_weight) + u64::from(emitter.error_weight);
    if total_weight == 0 {
        errors.push(ValidationError::NoSeverityWeight);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}

fn check_non_empty(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Empty { field });
    }
}

fn check_range(errors: &mut Vec<ValidationError>, field: &'static str, range: DelayRange) {
    if range.min > range.max {
        errors.push(ValidationError::InvertedRange {
            field,
            min: range.min,
            max: range.max,
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            field,
            reason: format!("unsupported scheme {:?}", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            reason: e.to_string(),
        }),
    }
}
