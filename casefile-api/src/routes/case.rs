//! Case REST API Routes
//!
//! Case creation returns 202 with an operation id immediately; clients poll
//! the operation routes until the pipeline finishes, then fetch the case.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use casefile_core::{Case, CaseId, CaseStatus, Difficulty, OwnerId};
use casefile_pipeline::CasePipeline;
use casefile_storage::CaseStore;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{CaseSummary, CreateCaseRequest, CreateCaseResponse, ListCasesResponse};

/// Query parameters for GET /api/v1/cases.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ListCasesQuery {
    #[cfg_attr(feature = "openapi", param(value_type = Option<String>, format = "uuid"))]
    pub owner_id: Option<OwnerId>,
    /// Optional status filter, e.g. "Active"
    pub status: Option<String>,
}

/// Build the case router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_case).get(list_cases))
        .route("/:id", get(get_case))
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/cases - Start generating a new case
#[utoipa::path(
    post,
    path = "/api/v1/cases",
    tag = "Cases",
    request_body = CreateCaseRequest,
    responses(
        (status = 202, description = "Generation accepted; poll the operation", body = CreateCaseResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn create_case(
    State(pipeline): State<Arc<CasePipeline>>,
    Json(req): Json<CreateCaseRequest>,
) -> ApiResult<impl IntoResponse> {
    let owner_id = req
        .owner_id
        .ok_or_else(|| ApiError::missing_field("owner_id"))?;

    let difficulty = req
        .difficulty
        .as_deref()
        .ok_or_else(|| ApiError::missing_field("difficulty"))?;
    let difficulty: Difficulty = difficulty
        .parse()
        .map_err(|_| ApiError::invalid_input("difficulty must be one of Rookie, Detective, Inspector"))?;

    let operation_id = pipeline.create_case(owner_id, difficulty);

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateCaseResponse { operation_id }),
    ))
}

/// GET /api/v1/cases/{id} - Fetch a generated case
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    tag = "Cases",
    params(
        ("id" = Uuid, Path, description = "Case ID")
    ),
    responses(
        (status = 200, description = "The case", body = Case),
        (status = 404, description = "Case not found", body = ApiError),
    )
)]
pub async fn get_case(
    State(store): State<Arc<dyn CaseStore>>,
    Path(id): Path<CaseId>,
) -> ApiResult<Json<Case>> {
    let case = store
        .case_get(id)
        .await?
        .ok_or_else(|| ApiError::case_not_found(id))?;
    Ok(Json(case))
}

/// GET /api/v1/cases - List cases for an owner
#[utoipa::path(
    get,
    path = "/api/v1/cases",
    tag = "Cases",
    params(ListCasesQuery),
    responses(
        (status = 200, description = "Cases owned by the caller", body = ListCasesResponse),
        (status = 400, description = "Missing owner_id", body = ApiError),
    )
)]
pub async fn list_cases(
    State(store): State<Arc<dyn CaseStore>>,
    Query(query): Query<ListCasesQuery>,
) -> ApiResult<Json<ListCasesResponse>> {
    let owner_id = query
        .owner_id
        .ok_or_else(|| ApiError::missing_field("owner_id"))?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<CaseStatus>()
                .map_err(|e| ApiError::invalid_input(e.to_string()))?,
        ),
        None => None,
    };

    let cases = store.case_list_by_owner(owner_id, status).await?;
    Ok(Json(ListCasesResponse {
        cases: cases.iter().map(CaseSummary::from).collect(),
    }))
}
