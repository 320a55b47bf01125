//! API Configuration Module
//!
//! Configuration for the HTTP surface, loaded from environment variables
//! with sensible defaults for development.

use crate::constants::{DEFAULT_BIND_HOST, DEFAULT_BIND_PORT, DEFAULT_CORS_MAX_AGE_SECS};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding and CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host for the HTTP listener.
    pub bind_host: String,

    /// Bind port for the HTTP listener.
    pub bind_port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            bind_port: DEFAULT_BIND_PORT,
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CASEFILE_API_BIND`: Bind host (default: "0.0.0.0")
    /// - `PORT` or `CASEFILE_API_PORT`: Bind port (default: 3000)
    /// - `CASEFILE_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `CASEFILE_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    pub fn from_env() -> Self {
        let bind_host =
            std::env::var("CASEFILE_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());

        let bind_port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("CASEFILE_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BIND_PORT);

        let cors_origins = std::env::var("CASEFILE_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("CASEFILE_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        Self {
            bind_host,
            bind_port,
            cors_origins,
            cors_max_age_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_host, DEFAULT_BIND_HOST);
        assert_eq!(config.bind_port, DEFAULT_BIND_PORT);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.cors_max_age_secs, DEFAULT_CORS_MAX_AGE_SECS);
    }

    #[test]
    fn test_config_from_env_defaults() {
        let config = ApiConfig::from_env();
        assert_eq!(config.bind_host, DEFAULT_BIND_HOST);
        assert_eq!(config.bind_port, DEFAULT_BIND_PORT);
    }
}
