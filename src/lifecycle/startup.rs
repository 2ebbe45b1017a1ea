//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize telemetry and logging before anything else logs
//! - Start the optional Prometheus listener and the background emitter
//! - Bind the listener and serve until a shutdown signal
//! - Flush and shut down the telemetry providers on the way out
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::emitter::BackgroundEmitter;
use crate::http::HttpServer;
use crate::lifecycle::signals::forward_signals;
use crate::lifecycle::Shutdown;
use crate::observability::logging::init_logging;
use crate::observability::metrics::init_metrics;
use crate::observability::Telemetry;

/// Run the service with a resolved configuration until shutdown.
pub async fn run(config: ServiceConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let telemetry = Arc::new(Telemetry::init(&config.service, &config.telemetry)?);
    init_logging(&config.telemetry, &telemetry)?;

    if config.telemetry.otlp_enabled {
        tracing::info!(
            service = %config.service.name,
            version = %config.service.version,
            environment = %config.service.environment,
            otlp_endpoint = %config.telemetry.otlp_endpoint,
            "Telemetry initialized"
        );
    } else {
        tracing::info!(service = %config.service.name, "OTLP export disabled");
    }

    if config.telemetry.metrics_enabled {
        let addr: SocketAddr = config.telemetry.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    // Everything fallible happens before any task is spawned.
    let emitter = if config.emitter.enabled {
        Some(BackgroundEmitter::new(telemetry.clone(), config.emitter.clone())?)
    } else {
        tracing::info!("Background emitter disabled");
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    let server = HttpServer::new(config, telemetry.clone())?;

    let shutdown = Shutdown::new();
    let signals = forward_signals(shutdown.clone());
    let emitter = emitter.map(|emitter| tokio::spawn(emitter.run(shutdown.subscribe())));

    let served = server.run(listener, shutdown.subscribe()).await;

    // The server also stops on I/O errors; make sure the emitter follows.
    shutdown.trigger();
    signals.abort();
    if let Some(handle) = emitter {
        match handle.await {
            Ok(iterations) => tracing::info!(iterations, "Background emitter stopped"),
            Err(e) => tracing::error!(error = %e, "Background emitter task failed"),
        }
    }

    let flushed = tokio::task::spawn_blocking(move || telemetry.shutdown()).await?;
    if let Err(e) = flushed {
        tracing::warn!(error = %e, "Telemetry shutdown incomplete");
    }

    served?;
    tracing::info!("Shutdown complete");
    Ok(())
}
