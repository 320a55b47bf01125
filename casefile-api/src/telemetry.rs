//! Tracing subscriber initialization
//!
//! Structured logging via tracing-subscriber with env-filter. JSON output is
//! opt-in for log shippers; the default human-readable format suits local
//! runs.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log filter directive, e.g. "info,casefile_pipeline=debug"
    pub log_filter: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: std::env::var("CASEFILE_LOG").unwrap_or_else(|_| "info".to_string()),
            json_output: std::env::var("CASEFILE_LOG_JSON")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Call once at startup before any tracing occurs. Returns quietly if a
/// subscriber is already installed (tests set their own).
pub fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_output {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_reads_env_or_info() {
        let config = TelemetryConfig::default();
        assert!(!config.log_filter.is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = TelemetryConfig {
            log_filter: "warn".to_string(),
            json_output: false,
        };
        init_tracing(&config);
        init_tracing(&config); // Second call must not panic.
    }
}
