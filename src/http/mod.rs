//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, server span parented on traceparent)
//!     → handlers.rs (endpoint span, simulated work, metrics)
//!         → upstream.rs (/api/items only: outbound call, client span)
//!     → response.rs (fixed JSON bodies)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, HttpServer};
pub use upstream::{UpstreamClient, UpstreamError};
