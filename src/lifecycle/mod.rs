//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Telemetry → Logging → Emitter → Listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests → Stop emitter → Flush telemetry
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: telemetry first, listener last
//! - Ordered shutdown: stop accept, drain, flush

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
