//! Reasoning lifecycle status
//!
//! Bookkeeping for one reasoning-enabled store: state transitions
//! (initialized, materialized, stale, error), fact counts, timestamps, and
//! the statistics of the last materialization run.

use crate::evaluate::MaterializeStats;
use std::time::{Duration, SystemTime};

/// Lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReasoningState {
    /// Created, nothing materialized yet
    Initialized,
    /// Closure is up to date
    Materialized,
    /// Schema or config changed since the last run
    Stale,
    /// The last run failed
    Error,
}

/// Lifecycle record for a reasoning-enabled store
#[derive(Clone, Debug)]
pub struct ReasoningStatus {
    /// Current state
    pub state: ReasoningState,
    /// Explicit fact count at the last run
    pub explicit_count: usize,
    /// Derived fact count at the last run
    pub derived_count: usize,
    /// Completed materialization runs
    pub materialization_runs: usize,
    /// Creation time
    pub created_at: SystemTime,
    /// Last update of any field
    pub updated_at: SystemTime,
    /// Completion time of the last materialization
    pub last_materialization: Option<SystemTime>,
    /// Statistics of the last materialization
    pub last_stats: Option<MaterializeStats>,
    /// Message of the last error
    pub last_error: Option<String>,
}

impl ReasoningStatus {
    /// Fresh status in the initialized state
    pub fn new() -> Self {
        let now = SystemTime::now();
        Self {
            state: ReasoningState::Initialized,
            explicit_count: 0,
            derived_count: 0,
            materialization_runs: 0,
            created_at: now,
            updated_at: now,
            last_materialization: None,
            last_stats: None,
            last_error: None,
        }
    }

    /// Record a completed materialization
    pub fn record_materialization(
        &mut self,
        explicit_count: usize,
        derived_count: usize,
        stats: MaterializeStats,
    ) {
        let now = SystemTime::now();
        self.state = ReasoningState::Materialized;
        self.explicit_count = explicit_count;
        self.derived_count = derived_count;
        self.materialization_runs += 1;
        self.last_materialization = Some(now);
        self.last_stats = Some(stats);
        self.last_error = None;
        self.updated_at = now;
    }

    /// Mark the closure out of date (schema change, config change)
    pub fn mark_stale(&mut self) {
        self.state = ReasoningState::Stale;
        self.updated_at = SystemTime::now();
    }

    /// Record a failed run
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.state = ReasoningState::Error;
        self.last_error = Some(message.into());
        self.updated_at = SystemTime::now();
    }

    /// Whether a (re-)materialization is needed
    pub fn needs_rematerialization(&self) -> bool {
        self.state != ReasoningState::Materialized
    }

    /// Whether the last run failed
    pub fn is_error(&self) -> bool {
        self.state == ReasoningState::Error
    }

    /// Time since the last materialization, if any
    pub fn elapsed_since_last_materialization(&self) -> Option<Duration> {
        self.last_materialization
            .and_then(|at| at.elapsed().ok())
    }
}

impl Default for ReasoningStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        let mut status = ReasoningStatus::new();
        assert_eq!(status.state, ReasoningState::Initialized);
        assert!(status.needs_rematerialization());
        assert!(!status.is_error());

        status.record_materialization(100, 40, MaterializeStats::default());
        assert_eq!(status.state, ReasoningState::Materialized);
        assert!(!status.needs_rematerialization());
        assert_eq!(status.explicit_count, 100);
        assert_eq!(status.derived_count, 40);
        assert_eq!(status.materialization_runs, 1);
        assert!(status.elapsed_since_last_materialization().is_some());

        status.mark_stale();
        assert_eq!(status.state, ReasoningState::Stale);
        assert!(status.needs_rematerialization());

        status.record_materialization(120, 50, MaterializeStats::default());
        assert_eq!(status.materialization_runs, 2);
        assert!(!status.needs_rematerialization());
    }

    #[test]
    fn test_error_state() {
        let mut status = ReasoningStatus::new();
        status.record_error("max iterations exceeded");
        assert!(status.is_error());
        assert!(status.needs_rematerialization());
        assert_eq!(
            status.last_error.as_deref(),
            Some("max iterations exceeded")
        );

        // A successful run clears the error.
        status.record_materialization(10, 2, MaterializeStats::default());
        assert!(!status.is_error());
        assert!(status.last_error.is_none());
    }
}
