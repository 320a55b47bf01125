//! REST API Routes Module
//!
//! Route handlers organized by concern:
//! - Case creation and retrieval
//! - Operation status polling
//! - Investigation actions (day-gated visits/interrogations, clues, findings)
//! - Health check endpoints (Kubernetes-compatible)
//! - CORS support for browser-based clients

pub mod case;
pub mod health;
pub mod investigation;
pub mod operation;

use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// Re-export route creation functions for convenience
pub use case::create_router as case_router;
pub use health::create_router as health_router;
pub use investigation::create_router as investigation_router;
pub use operation::create_router as operation_router;

/// Assemble the full API router.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> ApiResult<Router> {
    let cors = build_cors_layer(config)?;

    // Investigation routes share the /api/v1/cases prefix with the case CRUD
    // routes; merged so "/:id" and "/:id/visit" live in one nested router.
    let cases = case::create_router().merge(investigation::create_router());

    let router = Router::new()
        .nest("/api/v1/cases", cases)
        .nest("/api/v1/operations", operation::create_router())
        .nest("/health", health::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/docs")
            .url("/api-docs/openapi.json", <crate::openapi::ApiDoc as utoipa::OpenApi>::openapi()),
    );

    Ok(router)
}

fn build_cors_layer(config: &ApiConfig) -> ApiResult<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        // Dev mode: allow all origins.
        return Ok(layer.allow_origin(Any));
    }

    let origins: Result<Vec<HeaderValue>, _> = config
        .cors_origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect();
    let origins =
        origins.map_err(|e| ApiError::internal_error(format!("Invalid CORS origin: {}", e)))?;
    Ok(layer.allow_origin(origins))
}
