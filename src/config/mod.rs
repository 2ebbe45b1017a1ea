//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → cli.rs (flag / environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → cloned into the telemetry context, server state and emitter
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; telemetry wiring depends on it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, ConfigError};
pub use schema::{
    DelayRange, EmitterConfig, ListenerConfig, LogFormat, ServiceConfig, ServiceInfo,
    SimulationConfig, TelemetryConfig, UpstreamConfig,
};
