//! CASEFILE API - REST Polling Surface
//!
//! Thin HTTP layer over the pipeline, registry, store, and investigation
//! service. Clients poll rather than hold connections: case creation answers
//! 202 with an operation id, and the operation routes expose the job's
//! lifecycle until it is terminal.

pub mod config;
pub mod constants;
pub mod error;
pub mod macros;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::InvestigationService;
pub use state::AppState;
pub use telemetry::{init_tracing, TelemetryConfig};
pub use types::*;
