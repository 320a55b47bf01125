//! Shared application state for Axum routers.

use std::sync::Arc;

use casefile_pipeline::{CasePipeline, OperationRegistry};
use casefile_storage::CaseStore;

use crate::services::InvestigationService;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Durable store for cases, findings, and progress.
    pub store: Arc<dyn CaseStore>,
    /// Process-wide operation registry polled by clients.
    pub registry: Arc<OperationRegistry>,
    /// Case-generation pipeline.
    pub pipeline: Arc<CasePipeline>,
    /// Gated-action orchestration (visits, interrogations, findings).
    pub investigation: Arc<InvestigationService>,
    pub start_time: std::time::Instant,
}

// Use macro to reduce boilerplate for FromRef implementations
crate::impl_from_ref!(Arc<dyn CaseStore>, store);
crate::impl_from_ref!(Arc<OperationRegistry>, registry);
crate::impl_from_ref!(Arc<CasePipeline>, pipeline);
crate::impl_from_ref!(Arc<InvestigationService>, investigation);
crate::impl_from_ref!(std::time::Instant, start_time);
