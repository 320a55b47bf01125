//! Operation Status Routes
//!
//! The polling surface for asynchronous jobs. Pollers always get a
//! well-formed status object or a 404; never a raw error.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use casefile_core::OperationId;
use casefile_pipeline::OperationRegistry;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{ListOperationsResponse, OperationStatusResponse};

/// Build the operation router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_operations))
        .route("/:id", get(get_operation))
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/operations/{id} - Poll an operation's status
#[utoipa::path(
    get,
    path = "/api/v1/operations/{id}",
    tag = "Operations",
    params(
        ("id" = Uuid, Path, description = "Operation ID")
    ),
    responses(
        (status = 200, description = "Current operation status", body = OperationStatusResponse),
        (status = 404, description = "Operation unknown (never issued, evicted, or lost to a restart)", body = ApiError),
    )
)]
pub async fn get_operation(
    State(registry): State<Arc<OperationRegistry>>,
    Path(id): Path<OperationId>,
) -> ApiResult<Json<OperationStatusResponse>> {
    let operation = registry
        .get(id)
        .ok_or_else(|| ApiError::operation_not_found(id))?;
    Ok(Json(OperationStatusResponse::from(operation)))
}

/// GET /api/v1/operations - List known operation ids (diagnostic)
#[utoipa::path(
    get,
    path = "/api/v1/operations",
    tag = "Operations",
    responses(
        (status = 200, description = "Known operation ids", body = ListOperationsResponse),
    )
)]
pub async fn list_operations(
    State(registry): State<Arc<OperationRegistry>>,
) -> ApiResult<Json<ListOperationsResponse>> {
    Ok(Json(ListOperationsResponse {
        operations: registry.list(),
    }))
}
