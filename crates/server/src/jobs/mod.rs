// crates/server/src/jobs/mod.rs
//! Background work: the event publisher and the daily analysis batch.
//!
//! Provides:
//! - `EventPublisher`: sharded fire-and-forget event application
//! - `DailyAnalysisScheduler`: cron-driven and manual analysis runs
//! - `BatchState`: atomic Idle/Running state and progress for the batch

pub mod publisher;
pub mod scheduler;
pub mod state;
pub mod types;

pub use publisher::{EventApplier, EventPublisher, PublisherConfig};
pub use scheduler::{analysis_window, DailyAnalysisScheduler, SchedulerConfig, SchedulerError};
pub use state::BatchState;
pub use types::{AnalysisWindow, BatchProgress, BatchReport, BatchStatus, Trigger};
