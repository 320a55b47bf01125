//! OpenAPI documentation

use utoipa::OpenApi;

/// Aggregated OpenAPI document for the CASEFILE API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CASEFILE API",
        description = "Asynchronous mystery-case generation and investigation tracking",
        license(name = "MIT")
    ),
    paths(
        crate::routes::case::create_case,
        crate::routes::case::get_case,
        crate::routes::case::list_cases,
        crate::routes::operation::get_operation,
        crate::routes::operation::list_operations,
        crate::routes::investigation::visit_location,
        crate::routes::investigation::interrogate,
        crate::routes::investigation::discover_clue,
        crate::routes::investigation::add_finding,
        crate::routes::investigation::list_findings,
        crate::routes::investigation::get_progress,
        crate::routes::health::ping,
        crate::routes::health::live,
        crate::routes::health::ready,
    ),
    components(schemas(
        crate::error::ApiError,
        crate::error::ErrorCode,
        crate::types::CreateCaseRequest,
        crate::types::CreateCaseResponse,
        crate::types::CaseSummary,
        crate::types::ListCasesResponse,
        crate::types::OperationStatusResponse,
        crate::types::ListOperationsResponse,
        crate::types::VisitLocationRequest,
        crate::types::VisitLocationResponse,
        crate::types::InterrogateRequest,
        crate::types::InterrogateResponse,
        crate::types::DiscoverClueRequest,
        crate::types::DiscoverClueResponse,
        crate::types::AddFindingRequest,
        crate::types::ListFindingsResponse,
        crate::routes::health::HealthResponse,
        crate::routes::health::HealthStatus,
        crate::routes::health::HealthDetails,
        crate::routes::health::ComponentHealth,
        casefile_core::Case,
        casefile_core::CaseBundle,
        casefile_core::CaseMap,
        casefile_core::CaseMetadata,
        casefile_core::Clue,
        casefile_core::ClueSet,
        casefile_core::Finding,
        casefile_core::ImageRef,
        casefile_core::InterrogationRecord,
        casefile_core::InvestigationProgress,
        casefile_core::Location,
        casefile_core::Suspect,
        casefile_core::VisitRecord,
        casefile_core::CaseStatus,
        casefile_core::Difficulty,
        casefile_core::FindingImportance,
        casefile_core::FindingSource,
        casefile_core::OperationKind,
        casefile_core::OperationStatus,
    )),
    tags(
        (name = "Cases", description = "Case creation and retrieval"),
        (name = "Operations", description = "Polling surface for asynchronous jobs"),
        (name = "Investigation", description = "Day-gated actions, clues, and findings"),
        (name = "Health", description = "Liveness and readiness probes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/api/v1/cases"));
        assert!(json.contains("/api/v1/operations/{id}"));
        assert!(json.contains("CreateCaseRequest"));
    }
}
