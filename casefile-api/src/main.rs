//! CASEFILE API Server Entry Point
//!
//! Bootstraps configuration and providers, wires the pipeline, registry,
//! store, and investigation service, and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use casefile_api::{
    create_api_router, init_tracing, ApiConfig, ApiError, ApiResult, AppState,
    InvestigationService, TelemetryConfig,
};
use casefile_gen::providers::{BlobStoreUploadProvider, GeminiClient, GeminiGeneratorProvider};
use casefile_gen::{GeneratorProvider, UploadProvider};
use casefile_pipeline::{
    operation_eviction_task, CasePipeline, EvictionConfig, OperationRegistry, PipelineConfig,
};
use casefile_storage::{CaseStore, MemoryStore};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config);

    let generator = build_generator()?;
    let uploader = build_uploader()?;

    // In-process store and registry; both live for the process. The registry
    // intentionally has no cross-restart durability.
    let store: Arc<dyn CaseStore> = Arc::new(MemoryStore::new());
    let registry = Arc::new(OperationRegistry::new());

    let pipeline = Arc::new(CasePipeline::new(
        Arc::clone(&generator),
        Arc::clone(&uploader),
        Arc::clone(&store),
        Arc::clone(&registry),
        PipelineConfig::from_env(),
    ));
    let investigation = Arc::new(InvestigationService::new(
        Arc::clone(&store),
        Arc::clone(&generator),
    ));

    let state = AppState {
        store,
        registry: Arc::clone(&registry),
        pipeline,
        investigation,
        start_time: std::time::Instant::now(),
    };

    // Background eviction of old terminal operations.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let eviction = tokio::spawn(operation_eviction_task(
        registry,
        EvictionConfig::from_env(),
        shutdown_rx,
    ));

    let api_config = ApiConfig::from_env();
    let app: Router = create_api_router(state, &api_config)?;

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, "Starting CASEFILE API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = eviction.await;
    Ok(())
}

/// Build the Gemini generator from environment configuration.
///
/// - `CASEFILE_GEMINI_API_KEY` (required)
/// - `CASEFILE_GEMINI_RPM`: requests per minute (default: 30)
/// - `CASEFILE_GEMINI_TEXT_MODEL`, `CASEFILE_GEMINI_IMAGE_MODEL` (optional)
fn build_generator() -> ApiResult<Arc<dyn GeneratorProvider>> {
    let api_key = std::env::var("CASEFILE_GEMINI_API_KEY")
        .map_err(|_| ApiError::internal_error("CASEFILE_GEMINI_API_KEY is not set"))?;
    let rpm = std::env::var("CASEFILE_GEMINI_RPM")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);

    let mut provider = GeminiGeneratorProvider::new(GeminiClient::new(api_key, rpm));
    if let Ok(model) = std::env::var("CASEFILE_GEMINI_TEXT_MODEL") {
        provider = provider.with_text_model(model);
    }
    if let Ok(model) = std::env::var("CASEFILE_GEMINI_IMAGE_MODEL") {
        provider = provider.with_image_model(model);
    }
    Ok(Arc::new(provider))
}

/// Build the blob store uploader from environment configuration.
///
/// - `CASEFILE_BLOB_URL` (required)
/// - `CASEFILE_BLOB_TOKEN` (required)
fn build_uploader() -> ApiResult<Arc<dyn UploadProvider>> {
    let base_url = std::env::var("CASEFILE_BLOB_URL")
        .map_err(|_| ApiError::internal_error("CASEFILE_BLOB_URL is not set"))?;
    let token = std::env::var("CASEFILE_BLOB_TOKEN")
        .map_err(|_| ApiError::internal_error("CASEFILE_BLOB_TOKEN is not set"))?;
    Ok(Arc::new(BlobStoreUploadProvider::new(base_url, token)))
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.bind_host, config.bind_port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::internal_error(format!("Invalid bind address {}: {}", addr, e)))
}
