//! Pipeline metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracking pipeline activity since process start.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Cases generated and committed successfully
    pub cases_generated: AtomicU64,

    /// Pipeline runs that ended in a failed operation
    pub cases_failed: AtomicU64,

    /// Location images that failed to generate or upload (non-fatal)
    pub location_images_failed: AtomicU64,

    /// Map images that failed to generate or upload (non-fatal)
    pub map_images_failed: AtomicU64,

    /// Uploaded assets deleted after a failed persistence step
    pub assets_reclaimed: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            cases_generated: self.cases_generated.load(Ordering::Relaxed),
            cases_failed: self.cases_failed.load(Ordering::Relaxed),
            location_images_failed: self.location_images_failed.load(Ordering::Relaxed),
            map_images_failed: self.map_images_failed.load(Ordering::Relaxed),
            assets_reclaimed: self.assets_reclaimed.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Snapshot of pipeline metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineMetricsSnapshot {
    pub cases_generated: u64,
    pub cases_failed: u64,
    pub location_images_failed: u64,
    pub map_images_failed: u64,
    pub assets_reclaimed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_start_at_zero() {
        let metrics = PipelineMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cases_generated, 0);
        assert_eq!(snapshot.cases_failed, 0);
        assert_eq!(snapshot.location_images_failed, 0);
    }

    #[test]
    fn test_metrics_snapshot_reflects_counts() {
        let metrics = PipelineMetrics::new();
        metrics.cases_generated.store(3, Ordering::Relaxed);
        metrics.location_images_failed.store(2, Ordering::Relaxed);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cases_generated, 3);
        assert_eq!(snapshot.location_images_failed, 2);
        assert_eq!(snapshot.cases_failed, 0);
    }
}
