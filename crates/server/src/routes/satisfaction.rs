// crates/server/src/routes/satisfaction.rs
//! Job satisfaction endpoints: importance declaration, initialization,
//! current snapshot with score, and event history.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use career_log_core::{Dimensions, NewSatisfactionEvent, SatisfactionEvent, SatisfactionImportance};
use career_log_db::{DbError, DEFAULT_EVENT_LIMIT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response for an accepted initialization.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct InitAccepted {
    pub user_id: String,
    pub status: String,
}

/// Current satisfaction levels, importance weights and composite score.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct CurrentSatisfaction {
    pub user_id: String,
    pub levels: Dimensions,
    pub importance: Dimensions,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub user_id: String,
    pub events: Vec<SatisfactionEvent>,
}

/// POST /api/users/{user_id}/job-satisfaction/importance
///
/// Declares the user's six importance weights. A user declares once.
pub async fn declare_importance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<Dimensions>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SatisfactionImportance>)> {
    let Json(weights) = payload?;
    state.validator.check_user_id(&user_id)?;
    state.validator.check_levels(&weights)?;

    let importance = state.db.insert_importance(&user_id, &weights).await?;
    tracing::info!(user_id = %user_id, "importance declared");
    Ok((StatusCode::CREATED, Json(importance)))
}

/// POST /api/users/{user_id}/job-satisfaction/init
///
/// Validates the starting levels and publishes an `INIT_EVENT`. The
/// snapshot appears once the publisher has applied it.
pub async fn init_satisfaction(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<Dimensions>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InitAccepted>)> {
    let Json(levels) = payload?;
    state.validator.check_user_id(&user_id)?;
    state.validator.check_levels(&levels)?;

    if state.db.satisfaction_exists(&user_id).await? {
        return Err(ApiError::AlreadyInitialized(user_id));
    }

    state
        .publisher
        .publish(NewSatisfactionEvent::init(user_id.clone(), levels));
    Ok((
        StatusCode::ACCEPTED,
        Json(InitAccepted {
            user_id,
            status: "accepted".to_string(),
        }),
    ))
}

/// GET /api/users/{user_id}/job-satisfaction/current
pub async fn current_satisfaction(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<CurrentSatisfaction>> {
    let snapshot = state
        .db
        .get_satisfaction(&user_id)
        .await?
        .ok_or_else(|| DbError::NotInitialized {
            user_id: user_id.clone(),
        })?;

    Ok(Json(CurrentSatisfaction {
        score: snapshot.score(),
        user_id: snapshot.user_id,
        levels: snapshot.levels,
        importance: snapshot.importance,
        updated_at: snapshot.updated_at,
    }))
}

/// GET /api/users/{user_id}/job-satisfaction/events?limit=N
///
/// Newest first. `limit` defaults to 50 and is capped at 500.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Json<EventsResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
    let events = state.db.list_satisfaction_events(&user_id, limit).await?;
    Ok(Json(EventsResponse { user_id, events }))
}

/// Create the satisfaction routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/users/{user_id}/job-satisfaction/importance",
            post(declare_importance),
        )
        .route("/users/{user_id}/job-satisfaction/init", post(init_satisfaction))
        .route(
            "/users/{user_id}/job-satisfaction/current",
            get(current_satisfaction),
        )
        .route("/users/{user_id}/job-satisfaction/events", get(list_events))
}
