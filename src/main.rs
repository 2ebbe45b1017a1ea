//! LGTM demo service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request ──▶ request id ──▶ http_request span ──▶ handler span ──▶ Response
//!                                                                 │
//!                                                                 ├─▶ db_query span (/api/users)
//!                                                                 └─▶ fetch_details span ──▶ upstream
//!
//!     Background emitter ──▶ process_memory_usage + leveled log line, every interval
//!
//!     Telemetry ──▶ OTLP/gRPC (traces, metrics) · console/file logs · optional /metrics
//! ```

use clap::Parser;

use lgtm_demo::config::Cli;
use lgtm_demo::lifecycle::startup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = cli.resolve()?;
    startup::run(config).await
}
