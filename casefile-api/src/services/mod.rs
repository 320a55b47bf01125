//! Service layer
//!
//! Multi-step flows that route handlers delegate to.

pub mod investigation_service;

pub use investigation_service::InvestigationService;
