//! Operation Eviction Background Task
//!
//! The operation registry lives for the whole process, so a long-lived
//! server would otherwise accumulate every terminal operation it ever ran.
//! This task periodically evicts terminal entries past a retention window.
//! In-flight operations are never touched, and pollers of an evicted id get
//! the same not-found answer as after a restart.
//!
//! # Usage
//!
//! Spawned during server startup:
//!
//! ```ignore
//! use casefile_pipeline::{operation_eviction_task, EvictionConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(operation_eviction_task(registry, EvictionConfig::default(), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

use crate::registry::OperationRegistry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

/// Default interval between eviction sweeps in seconds.
pub const DEFAULT_EVICTION_CHECK_INTERVAL_SECS: u64 = 60;

/// Default retention for terminal operations in seconds (1 hour).
pub const DEFAULT_TERMINAL_RETENTION_SECS: u64 = 3600;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the operation eviction background task.
#[derive(Debug, Clone)]
pub struct EvictionConfig {
    /// How often to sweep for evictable operations (default: 60 seconds)
    pub check_interval: Duration,

    /// How long terminal operations stay pollable after completion
    /// (default: 1 hour)
    pub terminal_retention: Duration,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(DEFAULT_EVICTION_CHECK_INTERVAL_SECS),
            terminal_retention: Duration::from_secs(DEFAULT_TERMINAL_RETENTION_SECS),
        }
    }
}

impl EvictionConfig {
    /// Create EvictionConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CASEFILE_EVICTION_CHECK_INTERVAL_SECS`: Sweep interval (default: 60)
    /// - `CASEFILE_TERMINAL_RETENTION_SECS`: Terminal retention (default: 3600)
    pub fn from_env() -> Self {
        let check_interval = Duration::from_secs(
            std::env::var("CASEFILE_EVICTION_CHECK_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_EVICTION_CHECK_INTERVAL_SECS),
        );

        let terminal_retention = Duration::from_secs(
            std::env::var("CASEFILE_TERMINAL_RETENTION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TERMINAL_RETENTION_SECS),
        );

        Self {
            check_interval,
            terminal_retention,
        }
    }

    /// Create a configuration for development/testing with short windows.
    pub fn development() -> Self {
        Self {
            check_interval: Duration::from_secs(5),
            terminal_retention: Duration::from_secs(30),
        }
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Metrics for eviction sweeps.
#[derive(Debug, Default)]
pub struct EvictionMetrics {
    /// Total operations evicted since startup
    pub operations_evicted: AtomicU64,

    /// Total sweep cycles completed
    pub sweep_cycles: AtomicU64,
}

impl EvictionMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Background task that periodically evicts old terminal operations.
///
/// Runs until the shutdown signal flips to `true`. Returns the metrics
/// collected during the task's lifetime.
pub async fn operation_eviction_task(
    registry: Arc<OperationRegistry>,
    config: EvictionConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<EvictionMetrics> {
    let metrics = Arc::new(EvictionMetrics::new());

    let mut sweep_interval = interval(config.check_interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let retention = chrono::Duration::from_std(config.terminal_retention)
        .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_TERMINAL_RETENTION_SECS as i64));

    tracing::info!(
        check_interval_secs = config.check_interval.as_secs(),
        terminal_retention_secs = config.terminal_retention.as_secs(),
        "Operation eviction task started"
    );

    loop {
        tokio::select! {
            // Check for shutdown signal
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("Operation eviction task shutting down");
                    break;
                }
            }

            _ = sweep_interval.tick() => {
                metrics.sweep_cycles.fetch_add(1, Ordering::Relaxed);
                let evicted = registry.evict_terminal_older_than(retention);
                if evicted > 0 {
                    metrics.operations_evicted.fetch_add(evicted as u64, Ordering::Relaxed);
                    tracing::info!(evicted, "Evicted terminal operations");
                } else {
                    tracing::trace!("Eviction sweep found nothing to evict");
                }
            }
        }
    }

    tracing::info!(
        operations_evicted = metrics.operations_evicted.load(Ordering::Relaxed),
        sweep_cycles = metrics.sweep_cycles.load(Ordering::Relaxed),
        "Operation eviction task completed"
    );

    metrics
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_core::OperationKind;

    #[test]
    fn test_config_default() {
        let config = EvictionConfig::default();
        assert_eq!(
            config.check_interval,
            Duration::from_secs(DEFAULT_EVICTION_CHECK_INTERVAL_SECS)
        );
        assert_eq!(
            config.terminal_retention,
            Duration::from_secs(DEFAULT_TERMINAL_RETENTION_SECS)
        );
    }

    #[test]
    fn test_config_development() {
        let config = EvictionConfig::development();
        assert_eq!(config.check_interval, Duration::from_secs(5));
        assert_eq!(config.terminal_retention, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_task_stops_on_shutdown_signal() {
        let registry = Arc::new(OperationRegistry::new());
        registry.register(OperationKind::CaseGeneration);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(operation_eviction_task(
            Arc::clone(&registry),
            EvictionConfig {
                check_interval: Duration::from_millis(10),
                terminal_retention: Duration::from_secs(3600),
            },
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        let metrics = handle.await.unwrap();
        assert!(metrics.sweep_cycles.load(Ordering::Relaxed) >= 1);
        // Non-terminal operation survived every sweep.
        assert_eq!(registry.len(), 1);
    }
}
