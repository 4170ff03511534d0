// crates/server/src/jobs/state.rs
//! Atomic state tracking for the analysis batch.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::RwLock;

use super::types::{BatchProgress, BatchReport, BatchStatus};

/// Shared batch state: Idle or Running, per-record progress, last report.
///
/// Counters are lock-free atomics; only the last report sits behind a RwLock.
#[derive(Default)]
pub struct BatchState {
    status: AtomicU8,
    current: AtomicU64,
    total: AtomicU64,
    last_report: RwLock<Option<BatchReport>>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move Idle -> Running. Returns `None` if a run is already in progress.
    ///
    /// The returned guard moves the state back to Idle when dropped.
    pub fn try_start(&self) -> Option<RunGuard<'_>> {
        self.status
            .compare_exchange(
                BatchStatus::Idle as u8,
                BatchStatus::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()?;
        self.current.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
        Some(RunGuard { state: self })
    }

    pub fn status(&self) -> BatchStatus {
        BatchStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn last_report(&self) -> Option<BatchReport> {
        match self.last_report.read() {
            Ok(g) => g.clone(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading last report: {e}");
                None
            }
        }
    }

    /// Get a snapshot of the current batch state.
    pub fn snapshot(&self) -> BatchProgress {
        BatchProgress {
            status: self.status(),
            current: self.current.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
            last_report: self.last_report(),
        }
    }
}

/// Held for the duration of one run.
pub struct RunGuard<'a> {
    state: &'a BatchState,
}

impl RunGuard<'_> {
    pub fn set_total(&self, total: u64) {
        self.state.total.store(total, Ordering::Relaxed);
    }

    /// Count one attempted record. Returns the new current value.
    pub fn increment(&self) -> u64 {
        self.state.current.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn finish(&self, report: BatchReport) {
        match self.state.last_report.write() {
            Ok(mut guard) => *guard = Some(report),
            Err(e) => tracing::error!("RwLock poisoned writing last report: {e}"),
        }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state
            .status
            .store(BatchStatus::Idle as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::{AnalysisWindow, Trigger};
    use chrono::Utc;

    #[test]
    fn test_batch_state_lifecycle() {
        let state = BatchState::new();
        assert_eq!(state.snapshot().status, BatchStatus::Idle);

        let guard = state.try_start().unwrap();
        assert_eq!(state.status(), BatchStatus::Running);

        guard.set_total(3);
        assert_eq!(guard.increment(), 1);
        assert_eq!(guard.increment(), 2);
        let snap = state.snapshot();
        assert_eq!(snap.current, 2);
        assert_eq!(snap.total, 3);

        let now = Utc::now();
        guard.finish(BatchReport {
            trigger: Trigger::Manual,
            window: AnalysisWindow { start: now, end: now },
            conversations: 3,
            published: 2,
            failed: 1,
            started_at: now,
            finished_at: now,
        });
        drop(guard);

        let snap = state.snapshot();
        assert_eq!(snap.status, BatchStatus::Idle);
        assert_eq!(snap.last_report.unwrap().failed, 1);
    }

    #[test]
    fn test_second_start_rejected_while_running() {
        let state = BatchState::new();
        let guard = state.try_start().unwrap();
        assert!(state.try_start().is_none());
        drop(guard);
        assert!(state.try_start().is_some());
    }
}
