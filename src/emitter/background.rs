//! Periodic synthetic telemetry.
//!
//! # Responsibilities
//! - Nudge the memory gauge by a random signed delta each interval
//! - Log one line at a randomly weighted severity each interval
//! - Stop when the shutdown signal arrives

use std::sync::Arc;

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::EmitterConfig;
use crate::observability::Telemetry;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("invalid severity weights: {0}")]
    Weights(#[from] WeightedError),

    #[error("emitter interval must be greater than zero")]
    ZeroInterval,
}

/// Level of the line logged for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    const ALL: [Severity; 3] = [Severity::Info, Severity::Warn, Severity::Error];
}

/// Values drawn for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub memory_bytes: u64,
    pub delta_bytes: i64,
    pub severity: Severity,
}

impl Sample {
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / BYTES_PER_MB
    }
}

pub struct BackgroundEmitter {
    telemetry: Arc<Telemetry>,
    config: EmitterConfig,
    severity: WeightedIndex<u32>,
}

impl BackgroundEmitter {
    pub fn new(telemetry: Arc<Telemetry>, config: EmitterConfig) -> Result<Self, EmitterError> {
        if config.interval_secs == 0 {
            return Err(EmitterError::ZeroInterval);
        }
        let severity = WeightedIndex::new([config.info_weight, config.warn_weight, config.error_weight])?;

        Ok(Self {
            telemetry,
            config,
            severity,
        })
    }

    /// Draw one iteration's values.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Sample {
        let (min, max) = (self.config.memory_min_bytes, self.config.memory_max_bytes);
        let memory_bytes = if max > min { rng.gen_range(min..=max) } else { min };

        let max_delta = i64::try_from(self.config.max_delta_bytes).unwrap_or(i64::MAX);
        let delta_bytes = rng.gen_range(-max_delta..=max_delta);

        Sample {
            memory_bytes,
            delta_bytes,
            severity: Severity::ALL[self.severity.sample(rng)],
        }
    }

    /// Apply `sample` to the gauge and log it.
    pub fn emit(&self, sample: &Sample) {
        self.telemetry
            .instruments()
            .adjust_memory(&self.config.component, sample.delta_bytes);

        let mb = sample.memory_mb();
        match sample.severity {
            Severity::Info => {
                tracing::info!("System running normally. Current memory usage: {:.2} MB", mb)
            }
            Severity::Warn => tracing::warn!("High memory usage detected: {:.2} MB", mb),
            Severity::Error => tracing::error!("System resource critical! Memory: {:.2} MB", mb),
        }
    }

    /// One iteration with the thread-local RNG.
    pub fn tick(&self) -> Sample {
        let sample = self.sample(&mut rand::thread_rng());
        self.emit(&sample);
        sample
    }

    /// Emit every interval until `shutdown` fires. The first iteration runs
    /// immediately. Returns the number of completed iterations.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> u64 {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            component = %self.config.component,
            "Background emitter starting"
        );

        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut iterations = 0;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(iterations, "Background emitter received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick();
                    iterations += 1;
                }
            }
        }

        iterations
    }
}
