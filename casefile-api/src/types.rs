//! Request and response types for the CASEFILE API
//!
//! Required fields arrive as `Option` so their absence maps to a 400
//! MissingField response instead of a deserialization error.

use casefile_core::{
    Case, CaseId, Finding, InvestigationProgress, Operation, OperationId, OperationStatus,
    OwnerId, Timestamp,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// CASE TYPES
// ============================================================================

/// Request body for POST /api/v1/cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCaseRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub owner_id: Option<OwnerId>,
    /// One of "Rookie", "Detective", "Inspector"
    pub difficulty: Option<String>,
}

/// Response body for POST /api/v1/cases: poll the operation until terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCaseResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub operation_id: OperationId,
}

/// Condensed case listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseSummary {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub case_id: CaseId,
    pub difficulty: String,
    pub status: String,
    pub estimated_duration_minutes: i64,
    pub tags: Vec<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl From<&Case> for CaseSummary {
    fn from(case: &Case) -> Self {
        Self {
            case_id: case.case_id,
            difficulty: case.difficulty.to_string(),
            status: case.status.to_string(),
            estimated_duration_minutes: case.metadata.estimated_duration_minutes,
            tags: case.metadata.tags.clone(),
            created_at: case.created_at,
        }
    }
}

/// Response body for GET /api/v1/cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListCasesResponse {
    pub cases: Vec<CaseSummary>,
}

// ============================================================================
// OPERATION TYPES
// ============================================================================

/// Polling response for GET /api/v1/operations/{id}.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OperationStatusResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub operation_id: OperationId,
    pub status: OperationStatus,
    pub progress_percent: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

impl From<Operation> for OperationStatusResponse {
    fn from(operation: Operation) -> Self {
        Self {
            operation_id: operation.operation_id,
            status: operation.status,
            progress_percent: operation.progress_percent,
            message: operation.status_message,
            result: operation.result,
            error: operation.error,
            warnings: operation.warnings,
        }
    }
}

/// Diagnostic listing of known operation ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListOperationsResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub operations: Vec<OperationId>,
}

// ============================================================================
// INVESTIGATION TYPES
// ============================================================================

/// Request body for POST /api/v1/cases/{id}/visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitLocationRequest {
    pub location_id: Option<String>,
}

/// Response for a successful visit: the updated progress plus the finding
/// the visit surfaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitLocationResponse {
    pub progress: InvestigationProgress,
    pub finding: Finding,
}

/// Request body for POST /api/v1/cases/{id}/interrogate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InterrogateRequest {
    pub suspect: Option<String>,
    pub questions: Option<Vec<String>>,
}

/// Response for a successful interrogation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InterrogateResponse {
    pub progress: InvestigationProgress,
    /// One response per question asked
    pub responses: Vec<String>,
    pub finding: Finding,
}

/// Request body for POST /api/v1/cases/{id}/clues/discover.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DiscoverClueRequest {
    pub clue_id: Option<String>,
}

/// Response for a clue discovery. `finding` is absent when the clue had
/// already been discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DiscoverClueResponse {
    pub progress: InvestigationProgress,
    pub newly_discovered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding: Option<Finding>,
}

/// Request body for POST /api/v1/cases/{id}/findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AddFindingRequest {
    /// One of "Interrogation", "LocationVisit", "ClueDiscovery"
    pub source: Option<String>,
    pub source_details: Option<String>,
    pub text: Option<String>,
    /// One of "Minor", "Important", "Critical"
    pub importance: Option<String>,
}

/// Response body for GET /api/v1/cases/{id}/findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListFindingsResponse {
    pub findings: Vec<Finding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_core::{new_entity_id, OperationKind};
    use chrono::Utc;

    #[test]
    fn test_operation_status_response_from_operation() {
        let mut operation =
            Operation::queued(new_entity_id(), OperationKind::CaseGeneration, Utc::now());
        operation.status = OperationStatus::Processing;
        operation.progress_percent = 55;
        operation.status_message = "Generating location images".to_string();
        operation.warnings.push("image for 'x' unavailable".to_string());

        let response = OperationStatusResponse::from(operation.clone());
        assert_eq!(response.operation_id, operation.operation_id);
        assert_eq!(response.status, OperationStatus::Processing);
        assert_eq!(response.progress_percent, 55);
        assert_eq!(response.warnings.len(), 1);
        assert!(response.result.is_none());
    }

    #[test]
    fn test_operation_response_omits_empty_fields() {
        let operation =
            Operation::queued(new_entity_id(), OperationKind::CaseGeneration, Utc::now());
        let json =
            serde_json::to_string(&OperationStatusResponse::from(operation)).unwrap();
        assert!(!json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
        assert!(!json.contains("\"warnings\""));
    }

    #[test]
    fn test_create_case_request_tolerates_missing_fields() {
        let request: CreateCaseRequest = serde_json::from_str("{}").unwrap();
        assert!(request.owner_id.is_none());
        assert!(request.difficulty.is_none());
    }
}
