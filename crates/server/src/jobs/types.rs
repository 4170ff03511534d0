// crates/server/src/jobs/types.rs
//! Types for the daily analysis batch.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status of the analysis batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Idle = 0,
    Running = 1,
}

impl BatchStatus {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            _ => Self::Idle,
        }
    }
}

/// What started a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Scheduled,
    Manual,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open time range `[start, end)` of conversations one batch looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Summary of one finished batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub trigger: Trigger,
    pub window: AnalysisWindow,
    pub conversations: u64,
    pub published: u64,
    pub failed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Point-in-time view of the batch, served by the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub status: BatchStatus,
    pub current: u64,
    pub total: u64,
    pub last_report: Option<BatchReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_status_discriminants() {
        assert_eq!(BatchStatus::Idle as u8, 0);
        assert_eq!(BatchStatus::Running as u8, 1);
        assert_eq!(BatchStatus::from_u8(1), BatchStatus::Running);
        assert_eq!(BatchStatus::from_u8(7), BatchStatus::Idle);
    }

    #[test]
    fn test_batch_progress_serialize() {
        let progress = BatchProgress {
            status: BatchStatus::Running,
            current: 2,
            total: 5,
            last_report: None,
        };
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["current"], 2);
        assert!(json["lastReport"].is_null());
    }
}
