//! API route handlers for the career-log server.

pub mod analysis;
pub mod health;
pub mod metrics;
pub mod satisfaction;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined router.
///
/// Routes:
/// - GET  /api/health - Health check
/// - POST /api/users/{user_id}/job-satisfaction/importance - Declare importance weights
/// - POST /api/users/{user_id}/job-satisfaction/init - Initialize satisfaction levels
/// - GET  /api/users/{user_id}/job-satisfaction/current - Levels, importance and score
/// - GET  /api/users/{user_id}/job-satisfaction/events - Event history, newest first
/// - POST /api/analysis/daily - Run the daily conversation analysis now
/// - GET  /api/analysis/status - Daily analysis progress and last report
/// - GET  /metrics - Prometheus metrics
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", satisfaction::router())
        .nest("/api", analysis::router())
        .merge(metrics::router())
        .with_state(state)
}
