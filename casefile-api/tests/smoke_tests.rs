//! HTTP-level smoke tests over the assembled router with scripted providers.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use casefile_api::{create_api_router, ApiConfig, AppState, InvestigationService};
use casefile_core::OperationStatus;
use casefile_gen::{GeneratorProvider, UploadProvider};
use casefile_pipeline::{CasePipeline, OperationRegistry, PipelineConfig};
use casefile_storage::{CaseStore, MemoryStore};
use casefile_test_utils::{MockGenerator, MockUploader};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_router() -> Router {
    let generator = Arc::new(MockGenerator::new());
    let uploader = Arc::new(MockUploader::new());
    let store: Arc<dyn CaseStore> = Arc::new(MemoryStore::new());
    let registry = Arc::new(OperationRegistry::new());

    let pipeline = Arc::new(CasePipeline::new(
        Arc::clone(&generator) as Arc<dyn GeneratorProvider>,
        Arc::clone(&uploader) as Arc<dyn UploadProvider>,
        Arc::clone(&store),
        Arc::clone(&registry),
        PipelineConfig::development(),
    ));
    let investigation = Arc::new(InvestigationService::new(
        Arc::clone(&store),
        Arc::clone(&generator) as Arc<dyn GeneratorProvider>,
    ));

    let state = AppState {
        store,
        registry,
        pipeline,
        investigation,
        start_time: std::time::Instant::now(),
    };
    create_api_router(state, &ApiConfig::default()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn post(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

/// Drive a create-case request through to a terminal operation; returns the
/// generated case id.
async fn create_case_and_wait(router: &Router, owner_id: &str) -> String {
    let (status, body) = send(
        router,
        post(
            "/api/v1/cases",
            json!({"owner_id": owner_id, "difficulty": "Detective"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let operation_id = body["operation_id"].as_str().unwrap().to_string();

    for _ in 0..500 {
        let (status, body) =
            send(router, get(&format!("/api/v1/operations/{}", operation_id))).await;
        assert_eq!(status, StatusCode::OK);
        match body["status"].as_str().unwrap() {
            "Completed" => return body["result"]["case_id"].as_str().unwrap().to_string(),
            "Failed" => panic!("operation failed: {:?}", body),
            _ => tokio::time::sleep(Duration::from_millis(5)).await,
        }
    }
    panic!("operation never completed");
}

#[tokio::test]
async fn test_create_poll_fetch_flow() {
    let router = test_router();
    let owner = uuid::Uuid::now_v7().to_string();

    let case_id = create_case_and_wait(&router, &owner).await;

    let (status, case) = send(&router, get(&format!("/api/v1/cases/{}", case_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["owner_id"].as_str().unwrap(), owner);
    assert_eq!(case["status"].as_str().unwrap(), "Active");
    assert!(case["bundle"]["map"]["locations"].as_array().unwrap().len() >= 2);

    let (status, listing) = send(
        &router,
        get(&format!("/api/v1/cases?owner_id={}&status=Active", owner)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["cases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_case_missing_fields_is_400() {
    let router = test_router();

    let (status, body) = send(&router, post("/api/v1/cases", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"].as_str().unwrap(), "MISSING_FIELD");

    let (status, body) = send(
        &router,
        post(
            "/api/v1/cases",
            json!({"owner_id": uuid::Uuid::now_v7(), "difficulty": "Impossible"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"].as_str().unwrap(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_unknown_ids_are_404() {
    let router = test_router();
    let ghost = uuid::Uuid::now_v7();

    let (status, body) = send(&router, get(&format!("/api/v1/operations/{}", ghost))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"].as_str().unwrap(), "OPERATION_NOT_FOUND");

    let (status, body) = send(&router, get(&format!("/api/v1/cases/{}", ghost))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"].as_str().unwrap(), "CASE_NOT_FOUND");
}

#[tokio::test]
async fn test_visit_then_same_day_visit_is_429() {
    let router = test_router();
    let case_id = create_case_and_wait(&router, &uuid::Uuid::now_v7().to_string()).await;

    let (status, body) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/visit", case_id),
            json!({"location_id": "harbor-warehouse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["progress"]["visited_locations"]
        .get("harbor-warehouse")
        .is_some());
    assert_eq!(body["finding"]["source"].as_str().unwrap(), "LocationVisit");

    let (status, body) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/visit", case_id),
            json!({"location_id": "harbor-warehouse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"].as_str().unwrap(), "COOLDOWN_ACTIVE");

    // A different location is still allowed today.
    let (status, _) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/visit", case_id),
            json!({"location_id": "observatory"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_interrogation_flow_and_gate() {
    let router = test_router();
    let case_id = create_case_and_wait(&router, &uuid::Uuid::now_v7().to_string()).await;

    let (status, body) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/interrogate", case_id),
            json!({"suspect": "Vera Kline", "questions": ["Where were you?", "Who saw you?"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/interrogate", case_id),
            json!({"suspect": "Vera Kline", "questions": ["Really?"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"].as_str().unwrap(), "COOLDOWN_ACTIVE");

    let (status, body) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/interrogate", case_id),
            json!({"suspect": "Nobody", "questions": ["?"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"].as_str().unwrap(), "SUSPECT_NOT_FOUND");
}

#[tokio::test]
async fn test_clue_discovery_and_findings_listing() {
    let router = test_router();
    let case_id = create_case_and_wait(&router, &uuid::Uuid::now_v7().to_string()).await;

    let (status, body) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/clues/discover", case_id),
            json!({"clue_id": "clue-1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["newly_discovered"].as_bool().unwrap());

    // Idempotent re-discovery.
    let (status, body) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/clues/discover", case_id),
            json!({"clue_id": "clue-1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["newly_discovered"].as_bool().unwrap());

    let (status, body) = send(
        &router,
        post(
            &format!("/api/v1/cases/{}/findings", case_id),
            json!({"source": "ClueDiscovery", "text": "Tide tables contradict the alibi.",
                   "importance": "Critical"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body2) = send(&router, get(&format!("/api/v1/cases/{}/findings", case_id))).await;
    assert_eq!(status, StatusCode::OK);
    let findings = body2["findings"].as_array().unwrap();
    // Clue discovery finding + custom finding, in insertion order.
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0]["source"].as_str().unwrap(), "ClueDiscovery");
    assert_eq!(
        findings[1]["finding_id"].as_str().unwrap(),
        body["finding_id"].as_str().unwrap()
    );
}

#[tokio::test]
async fn test_progress_endpoint_reflects_actions() {
    let router = test_router();
    let case_id = create_case_and_wait(&router, &uuid::Uuid::now_v7().to_string()).await;

    send(
        &router,
        post(
            &format!("/api/v1/cases/{}/visit", case_id),
            json!({"location_id": "grand-hotel"}),
        ),
    )
    .await;

    let (status, progress) =
        send(&router, get(&format!("/api/v1/cases/{}/progress", case_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(progress["visited_locations"].get("grand-hotel").is_some());
    assert_eq!(progress["revision"].as_i64().unwrap(), 1);
}

#[tokio::test]
async fn test_degraded_image_generation_still_completes_via_api() {
    let generator = Arc::new(MockGenerator::new());
    generator.fail_images_containing("Grand Hotel");
    let uploader = Arc::new(MockUploader::new());
    let store: Arc<dyn CaseStore> = Arc::new(MemoryStore::new());
    let registry = Arc::new(OperationRegistry::new());

    let pipeline = Arc::new(CasePipeline::new(
        Arc::clone(&generator) as Arc<dyn GeneratorProvider>,
        Arc::clone(&uploader) as Arc<dyn UploadProvider>,
        Arc::clone(&store),
        Arc::clone(&registry),
        PipelineConfig::development(),
    ));
    let investigation = Arc::new(InvestigationService::new(
        Arc::clone(&store),
        Arc::clone(&generator) as Arc<dyn GeneratorProvider>,
    ));
    let router = create_api_router(
        AppState {
            store,
            registry: Arc::clone(&registry),
            pipeline,
            investigation,
            start_time: std::time::Instant::now(),
        },
        &ApiConfig::default(),
    )
    .unwrap();

    let case_id = create_case_and_wait(&router, &uuid::Uuid::now_v7().to_string()).await;
    let operation_id = registry.list()[0];
    let operation = registry.get(operation_id).unwrap();
    assert_eq!(operation.status, OperationStatus::Completed);
    assert_eq!(operation.warnings.len(), 1);

    let (_, case) = send(&router, get(&format!("/api/v1/cases/{}", case_id))).await;
    let locations = case["bundle"]["map"]["locations"].as_array().unwrap();
    let hotel = locations
        .iter()
        .find(|l| l["id"] == "grand-hotel")
        .unwrap();
    assert!(hotel["image"].is_null());
}

#[tokio::test]
async fn test_health_endpoints() {
    let router = test_router();

    let (status, _) = send(&router, get("/health/ping")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"].as_str().unwrap(), "healthy");
    assert!(body["details"]["store"]["latency_ms"].is_u64() || body["details"]["store"]["latency_ms"].is_number());
}
