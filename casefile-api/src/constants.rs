//! Constants for CASEFILE API

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_BIND_PORT: u16 = 3000;

// ============================================================================
// GATED ACTIONS
// ============================================================================

/// Bounded retries for the optimistic progress write. Two racing gated
/// actions settle on the first retry; more than a couple of conflicts in a
/// row means something is wrong.
pub const MAX_PROGRESS_WRITE_ATTEMPTS: usize = 3;

/// Maximum questions accepted per interrogation request.
pub const MAX_INTERROGATION_QUESTIONS: usize = 10;
