//! Snapshot guard.
//!
//! Refuses to replace a stored snapshot when the new one lost most of its
//! items, which usually means the listing changed layout or the crawl broke
//! rather than the source really emptying.

use crate::error::{AppError, Result};
use crate::models::GuardConfig;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardResult {
    /// Safe to replace the snapshot
    Safe {
        current_count: usize,
        previous_count: usize,
    },
    /// No usable previous snapshot
    ColdStart { current_count: usize },
    /// Count dropped beyond the threshold
    Triggered {
        current_count: usize,
        previous_count: usize,
        drop_percent: f64,
    },
    /// Nothing found where items existed before
    EmptyResult { previous_count: usize },
}

/// Guard comparing the item counts of consecutive snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotGuard {
    config: GuardConfig,
}

impl Default for SnapshotGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl SnapshotGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Compare the new item count against the previous one.
    pub fn check(&self, current_count: usize, previous_count: usize) -> GuardResult {
        if previous_count == 0 || previous_count < self.config.min_baseline {
            return GuardResult::ColdStart { current_count };
        }

        if current_count == 0 {
            return GuardResult::EmptyResult { previous_count };
        }

        if current_count < previous_count {
            let drop = previous_count - current_count;
            let drop_percent = (drop as f64 / previous_count as f64) * 100.0;

            if drop_percent > self.config.max_drop_percent as f64 {
                return GuardResult::Triggered {
                    current_count,
                    previous_count,
                    drop_percent,
                };
            }
        }

        GuardResult::Safe {
            current_count,
            previous_count,
        }
    }

    /// Return an error when the snapshot must not be written.
    pub fn validate(&self, current_count: usize, previous_count: usize) -> Result<()> {
        match self.check(current_count, previous_count) {
            GuardResult::Safe { .. } | GuardResult::ColdStart { .. } => Ok(()),
            GuardResult::Triggered {
                current_count,
                previous_count,
                drop_percent,
            } => Err(AppError::SnapshotGuard {
                current_count,
                previous_count,
                drop_percent,
            }),
            GuardResult::EmptyResult { previous_count } => Err(AppError::SnapshotGuard {
                current_count: 0,
                previous_count,
                drop_percent: 100.0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_no_drop() {
        let guard = SnapshotGuard::default();
        assert!(matches!(guard.check(20, 20), GuardResult::Safe { .. }));
    }

    #[test]
    fn test_safe_small_drop() {
        let guard = SnapshotGuard::default();
        assert!(matches!(guard.check(15, 20), GuardResult::Safe { .. }));
    }

    #[test]
    fn test_triggered_large_drop() {
        let guard = SnapshotGuard::default();
        assert!(matches!(guard.check(5, 20), GuardResult::Triggered { .. }));
    }

    #[test]
    fn test_cold_start() {
        let guard = SnapshotGuard::default();
        assert!(matches!(guard.check(3, 0), GuardResult::ColdStart { .. }));
        assert!(matches!(guard.check(0, 0), GuardResult::ColdStart { .. }));
        // below baseline
        assert!(matches!(guard.check(1, 4), GuardResult::ColdStart { .. }));
        assert!(matches!(guard.check(0, 4), GuardResult::ColdStart { .. }));
    }

    #[test]
    fn test_empty_result() {
        let guard = SnapshotGuard::default();
        assert_eq!(
            guard.check(0, 12),
            GuardResult::EmptyResult { previous_count: 12 }
        );
    }

    #[test]
    fn test_increase_is_safe() {
        let guard = SnapshotGuard::default();
        assert!(matches!(guard.check(30, 20), GuardResult::Safe { .. }));
    }

    #[test]
    fn test_validate_returns_error() {
        let guard = SnapshotGuard::new(GuardConfig {
            max_drop_percent: 10,
            min_baseline: 5,
        });
        assert!(guard.validate(9, 10).is_ok());
        assert!(matches!(
            guard.validate(8, 10).unwrap_err(),
            AppError::SnapshotGuard { .. }
        ));
    }
}
