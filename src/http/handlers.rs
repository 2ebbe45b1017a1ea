//! Endpoint handlers.
//!
//! Each handler opens its own span (a child of the `http_request` server
//! span), runs its simulated work inside it, records metrics and returns a
//! fixed body. Spans are attached with `Instrument`, so they close when the
//! handler future completes or is dropped.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tokio::time::sleep;
use tracing::field::Empty;
use tracing::{Instrument, Span};

use crate::config::SimulationConfig;
use crate::http::response::{ErrorResponse, HealthResponse, ItemsResponse, UsersResponse, GREETING};
use crate::http::server::AppState;
use crate::observability::tracing::{mark_error, record_trace_id};
use crate::observability::Endpoint;

const GET: &str = "GET";

/// `GET /`
pub async fn home(State(state): State<AppState>) -> &'static str {
    let span = tracing::info_span!("home_endpoint", trace_id = Empty);
    record_trace_id(&span);

    async move {
        tracing::info!("Home endpoint accessed");
        state.telemetry.instruments().record_request(Endpoint::Home, GET, None);

        let delay = state.simulation.home_delay_ms.sample(&mut rand::thread_rng());
        sleep(delay).await;
        GREETING
    }
    .instrument(span)
    .await
}

/// `GET /api/users`
pub async fn list_users(State(state): State<AppState>) -> Json<UsersResponse> {
    let span = tracing::info_span!("list_users", trace_id = Empty);
    record_trace_id(&span);

    async move {
        let started = Instant::now();
        query_users(&state.simulation).await;
        let elapsed = started.elapsed();

        let instruments = state.telemetry.instruments();
        instruments.record_request(Endpoint::Users, GET, None);
        instruments.record_duration(Endpoint::Users, elapsed);

        tracing::info!(
            duration_secs = elapsed.as_secs_f64(),
            "Users API call completed in {:.4} seconds",
            elapsed.as_secs_f64()
        );
        Json(UsersResponse::default())
    }
    .instrument(span)
    .await
}

/// Simulated database query. A failure is recorded on its span and logged,
/// never returned.
async fn query_users(simulation: &SimulationConfig) {
    let span = tracing::info_span!(
        "db_query",
        db.name = "user_database",
        db.query = "SELECT * FROM users",
        otel.status_code = Empty,
        otel.status_message = Empty,
    );

    async {
        let delay = simulation.db_delay_ms.sample(&mut rand::thread_rng());
        sleep(delay).await;

        if rand::random::<f64>() < simulation.db_error_probability {
            tracing::error!("Database timeout while fetching users");
            mark_error(&Span::current(), "Database timeout");
        }
    }
    .instrument(span)
    .await
}

/// `GET /api/items`
pub async fn list_items(State(state): State<AppState>) -> Json<ItemsResponse> {
    let span = tracing::info_span!(
        "list_items",
        http.method = GET,
        http.route = "/api/items",
        trace_id = Empty,
    );
    record_trace_id(&span);

    async move {
        let started = Instant::now();

        match state.upstream.fetch_details(&state.telemetry).await {
            Ok(status) if status == StatusCode::OK => {}
            Ok(status) => {
                tracing::warn!(
                    status = status.as_u16(),
                    "External API returned status {}",
                    status.as_u16()
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Error calling external API: {}", e);
            }
        }

        let delay = state.simulation.items_delay_ms.sample(&mut rand::thread_rng());
        sleep(delay).await;

        let elapsed = started.elapsed();
        let instruments = state.telemetry.instruments();
        instruments.record_request(Endpoint::Items, GET, None);
        instruments.record_duration(Endpoint::Items, elapsed);

        let secs = elapsed.as_secs_f64();
        if elapsed > state.simulation.slow_items_threshold() {
            tracing::warn!(duration_secs = secs, "Slow items API call: {:.4} seconds", secs);
        } else {
            tracing::info!(duration_secs = secs, "Items API call completed in {:.4} seconds", secs);
        }

        Json(ItemsResponse::default())
    }
    .instrument(span)
    .await
}

/// `GET /api/error`
pub async fn deliberate_error(State(state): State<AppState>) -> (StatusCode, Json<ErrorResponse>) {
    let span = tracing::info_span!(
        "error_endpoint",
        otel.status_code = Empty,
        otel.status_message = Empty,
        trace_id = Empty,
    );
    record_trace_id(&span);

    async move {
        tracing::error!("Error endpoint accessed deliberately");
        mark_error(&Span::current(), "Deliberate error for testing");
        state
            .telemetry
            .instruments()
            .record_request(Endpoint::Error, GET, Some("error"));

        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::test_error()))
    }
    .instrument(span)
    .await
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(&state.telemetry.service().name))
}
