// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use career_log_core::Validator;
use career_log_db::Database;

use crate::jobs::{BatchState, DailyAnalysisScheduler, EventPublisher};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Database handle for snapshot, importance and event queries.
    pub db: Database,
    /// Range checks for submitted levels and weights.
    pub validator: Validator,
    /// Fire-and-forget event application.
    pub publisher: Arc<EventPublisher>,
    /// Daily analysis state (lock-free atomics), shared with the scheduler.
    pub batch: Arc<BatchState>,
    /// `None` when no language model is configured.
    pub scheduler: Option<Arc<DailyAnalysisScheduler>>,
}

impl AppState {
    /// Create state without a daily analysis scheduler.
    pub fn new(db: Database, publisher: Arc<EventPublisher>) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            db,
            validator: Validator::new(),
            publisher,
            batch: Arc::new(BatchState::new()),
            scheduler: None,
        })
    }

    /// Create state with a scheduler. `batch` must be the state the scheduler was built with.
    pub fn with_scheduler(
        db: Database,
        publisher: Arc<EventPublisher>,
        batch: Arc<BatchState>,
        scheduler: Arc<DailyAnalysisScheduler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            db,
            validator: Validator::new(),
            publisher,
            batch,
            scheduler: Some(scheduler),
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
