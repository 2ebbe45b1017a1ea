//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the five demo routes
//! - Wire up middleware (request ID, server span, timeout)
//! - Serve on a bound listener until shutdown is signalled

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ListenerConfig, ServiceConfig, SimulationConfig};
use crate::http::handlers;
use crate::http::request::{make_server_span, on_response, propagate_request_id_layer, set_request_id_layer};
use crate::http::upstream::{UpstreamClient, UpstreamError};
use crate::observability::Telemetry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<Telemetry>,
    pub upstream: UpstreamClient,
    pub simulation: Arc<SimulationConfig>,
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ListenerConfig, state: AppState) -> Router {
    let telemetry = state.telemetry.clone();

    Router::new()
        .route("/", get(handlers::home))
        .route("/api/users", get(handlers::list_users))
        .route("/api/items", get(handlers::list_items))
        .route("/api/error", get(handlers::deliberate_error))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(propagate_request_id_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| make_server_span(&telemetry, request))
                .on_response(on_response),
        )
        .layer(set_request_id_layer())
}

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, telemetry: Arc<Telemetry>) -> Result<Self, UpstreamError> {
        let state = AppState {
            telemetry,
            upstream: UpstreamClient::new(&config.upstream)?,
            simulation: Arc::new(config.simulation.clone()),
        };

        let router = build_router(&config.listener, state);
        Ok(Self { router, config })
    }

    /// The assembled router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
