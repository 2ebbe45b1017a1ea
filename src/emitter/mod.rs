//! Background telemetry emitter.
//!
//! # Data Flow
//! ```text
//! interval tick
//!     → sample (memory value, gauge delta, severity)
//!     → process_memory_usage += delta
//!     → one log line at the chosen severity
//! shutdown signal → loop exits, iteration count returned
//! ```

mod background;

pub use background::{BackgroundEmitter, EmitterError, Sample, Severity};
