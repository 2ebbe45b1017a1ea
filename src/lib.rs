//! Demo HTTP service that produces synthetic traces, metrics and logs for an
//! OpenTelemetry (LGTM) backend.

pub mod config;
pub mod emitter;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Telemetry;
