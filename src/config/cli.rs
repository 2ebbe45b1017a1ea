//! Command-line and environment overrides.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::ServiceConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "lgtm-demo")]
#[command(about = "Demo service emitting synthetic traces, metrics and logs", long_about = None)]
pub struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "LGTM_DEMO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listener bind address.
    #[arg(long, env = "LGTM_DEMO_BIND_ADDRESS")]
    pub bind: Option<String>,

    /// OTLP/gRPC collector endpoint.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Value of the `service.name` resource attribute.
    #[arg(long, env = "OTEL_SERVICE_NAME")]
    pub service_name: Option<String>,

    /// Value of the `deployment.environment` resource attribute.
    #[arg(long, env = "LGTM_DEMO_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Disable OTLP export (logs and Prometheus only).
    #[arg(long)]
    pub no_otlp: bool,
}

impl Cli {
    /// Overlay the flags onto `config`.
    pub fn apply(&self, config: &mut ServiceConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(endpoint) = &self.otlp_endpoint {
            config.telemetry.otlp_endpoint = endpoint.clone();
        }
        if let Some(name) = &self.service_name {
            config.service.name = name.clone();
        }
        if let Some(environment) = &self.environment {
            config.service.environment = environment.clone();
        }
        if self.no_otlp {
            config.telemetry.otlp_enabled = false;
        }
    }

    /// Load the file (or defaults), apply overrides, then validate the result.
    pub fn resolve(&self) -> Result<ServiceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServiceConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
