//! Investigation Action Routes
//!
//! The day-gated actions (visit, interrogate) answer 429 with the reopening
//! date while the gate is closed. Clue discovery and findings are ungated.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use casefile_core::{CaseId, FindingImportance, FindingSource, InvestigationProgress};
use casefile_storage::CaseStore;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::InvestigationService;
use crate::state::AppState;
use crate::types::{
    AddFindingRequest, DiscoverClueRequest, DiscoverClueResponse, InterrogateRequest,
    InterrogateResponse, ListFindingsResponse, VisitLocationRequest, VisitLocationResponse,
};
use crate::validation::ValidateNonEmpty;

/// Build the investigation router (nested under /api/v1/cases).
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/:id/visit", post(visit_location))
        .route("/:id/interrogate", post(interrogate))
        .route("/:id/clues/discover", post(discover_clue))
        .route("/:id/findings", post(add_finding).get(list_findings))
        .route("/:id/progress", get(get_progress))
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/cases/{id}/visit - Visit a location (once per local day)
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/visit",
    tag = "Investigation",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = VisitLocationRequest,
    responses(
        (status = 200, description = "Visit recorded", body = VisitLocationResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Case or location not found", body = ApiError),
        (status = 429, description = "Location already visited today", body = ApiError),
    )
)]
pub async fn visit_location(
    State(service): State<Arc<InvestigationService>>,
    Path(case_id): Path<CaseId>,
    Json(req): Json<VisitLocationRequest>,
) -> ApiResult<Json<VisitLocationResponse>> {
    let location_id = req
        .location_id
        .ok_or_else(|| ApiError::missing_field("location_id"))?;
    location_id.validate_non_empty("location_id")?;

    let (progress, finding) = service
        .visit_location(case_id, &location_id, Utc::now())
        .await?;
    Ok(Json(VisitLocationResponse { progress, finding }))
}

/// POST /api/v1/cases/{id}/interrogate - Interrogate a suspect (once per local day)
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/interrogate",
    tag = "Investigation",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = InterrogateRequest,
    responses(
        (status = 200, description = "Interrogation recorded", body = InterrogateResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Case or suspect not found", body = ApiError),
        (status = 429, description = "Suspect already interrogated today", body = ApiError),
    )
)]
pub async fn interrogate(
    State(service): State<Arc<InvestigationService>>,
    Path(case_id): Path<CaseId>,
    Json(req): Json<InterrogateRequest>,
) -> ApiResult<Json<InterrogateResponse>> {
    let suspect = req
        .suspect
        .ok_or_else(|| ApiError::missing_field("suspect"))?;
    suspect.validate_non_empty("suspect")?;
    let questions = req
        .questions
        .ok_or_else(|| ApiError::missing_field("questions"))?;

    let (progress, responses, finding) = service
        .interrogate(case_id, &suspect, questions, Utc::now())
        .await?;
    Ok(Json(InterrogateResponse {
        progress,
        responses,
        finding,
    }))
}

/// POST /api/v1/cases/{id}/clues/discover - Mark a clue discovered (ungated)
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/clues/discover",
    tag = "Investigation",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = DiscoverClueRequest,
    responses(
        (status = 200, description = "Clue recorded (idempotent)", body = DiscoverClueResponse),
        (status = 404, description = "Case or clue not found", body = ApiError),
    )
)]
pub async fn discover_clue(
    State(service): State<Arc<InvestigationService>>,
    Path(case_id): Path<CaseId>,
    Json(req): Json<DiscoverClueRequest>,
) -> ApiResult<Json<DiscoverClueResponse>> {
    let clue_id = req
        .clue_id
        .ok_or_else(|| ApiError::missing_field("clue_id"))?;
    clue_id.validate_non_empty("clue_id")?;

    let (progress, newly_discovered, finding) =
        service.discover_clue(case_id, &clue_id, Utc::now()).await?;
    Ok(Json(DiscoverClueResponse {
        progress,
        newly_discovered,
        finding,
    }))
}

/// POST /api/v1/cases/{id}/findings - Append a finding (ungated)
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/findings",
    tag = "Investigation",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = AddFindingRequest,
    responses(
        (status = 201, description = "Finding appended", body = casefile_core::Finding),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Case not found", body = ApiError),
    )
)]
pub async fn add_finding(
    State(service): State<Arc<InvestigationService>>,
    Path(case_id): Path<CaseId>,
    Json(req): Json<AddFindingRequest>,
) -> ApiResult<impl IntoResponse> {
    let source = req
        .source
        .as_deref()
        .ok_or_else(|| ApiError::missing_field("source"))?;
    let source = FindingSource::from_db_str(source)
        .map_err(|e| ApiError::invalid_input(e.to_string()))?;

    let text = req.text.ok_or_else(|| ApiError::missing_field("text"))?;
    text.validate_non_empty("text")?;

    let importance = match req.importance.as_deref() {
        Some(raw) => FindingImportance::from_db_str(raw)
            .map_err(|e| ApiError::invalid_input(e.to_string()))?,
        None => FindingImportance::Minor,
    };

    let finding = service
        .add_finding(
            case_id,
            source,
            req.source_details.unwrap_or_default(),
            text,
            importance,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(finding)))
}

/// GET /api/v1/cases/{id}/findings - List a case's findings
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/findings",
    tag = "Investigation",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Findings in insertion order", body = ListFindingsResponse),
        (status = 404, description = "Case not found", body = ApiError),
    )
)]
pub async fn list_findings(
    State(store): State<Arc<dyn CaseStore>>,
    Path(case_id): Path<CaseId>,
) -> ApiResult<Json<ListFindingsResponse>> {
    store
        .case_get(case_id)
        .await?
        .ok_or_else(|| ApiError::case_not_found(case_id))?;

    let findings = store.finding_list(case_id).await?;
    Ok(Json(ListFindingsResponse { findings }))
}

/// GET /api/v1/cases/{id}/progress - Current investigation progress
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/progress",
    tag = "Investigation",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Current progress record", body = InvestigationProgress),
        (status = 404, description = "Case not found", body = ApiError),
    )
)]
pub async fn get_progress(
    State(store): State<Arc<dyn CaseStore>>,
    Path(case_id): Path<CaseId>,
) -> ApiResult<Json<InvestigationProgress>> {
    let progress = store
        .progress_get(case_id)
        .await?
        .ok_or_else(|| ApiError::case_not_found(case_id))?;
    Ok(Json(progress))
}
