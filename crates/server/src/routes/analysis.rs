// crates/server/src/routes/analysis.rs
//! Daily analysis endpoints: manual trigger and batch status.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::error::{ApiError, ApiResult};
use crate::jobs::{BatchProgress, BatchReport, Trigger};
use crate::state::AppState;

/// POST /api/analysis/daily - Run the daily analysis now.
///
/// Waits for the batch and returns its report. The batch runs on its own
/// task, so it completes even if the client goes away. 409 while another
/// run is in progress; 503 when no language model is configured.
pub async fn run_daily_analysis(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BatchReport>> {
    let scheduler = state.scheduler.clone().ok_or_else(|| {
        ApiError::AnalysisUnavailable("no language model is configured".to_string())
    })?;
    let report = tokio::spawn(async move { scheduler.run_now(Trigger::Manual).await })
        .await
        .map_err(|e| ApiError::Internal(format!("daily analysis task failed: {e}")))??;
    Ok(Json(report))
}

/// GET /api/analysis/status - Idle/Running, progress and the last report.
pub async fn analysis_status(State(state): State<Arc<AppState>>) -> Json<BatchProgress> {
    Json(state.batch.snapshot())
}

/// Create the analysis routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analysis/daily", post(run_daily_analysis))
        .route("/analysis/status", get(analysis_status))
}
