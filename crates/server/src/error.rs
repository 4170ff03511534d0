// crates/server/src/error.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use career_log_core::ValidationError;
use career_log_db::DbError;
use serde::Serialize;
use thiserror::Error;

use crate::jobs::SchedulerError;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Job satisfaction already initialized for user {0}")]
    AlreadyInitialized(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    #[error("Daily analysis is already running")]
    BatchRunning,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<SchedulerError> for ApiError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::AlreadyRunning => Self::BatchRunning,
            SchedulerError::Storage(db) => Self::Database(db),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::AlreadyInitialized(user_id) => {
                tracing::warn!(user_id = %user_id, "Job satisfaction already initialized");
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::with_details(
                        "Already initialized",
                        format!("User ID: {}", user_id),
                    ),
                )
            }
            ApiError::Validation(err) => {
                tracing::warn!(error = %err, "Validation failed");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Validation failed", err.to_string()),
                )
            }
            ApiError::Database(db_err) => match db_err {
                DbError::NotInitialized { user_id } => {
                    tracing::warn!(user_id = %user_id, "Job satisfaction not initialized");
                    (
                        StatusCode::NOT_FOUND,
                        ErrorResponse::with_details(
                            "Not initialized",
                            format!("User ID: {}", user_id),
                        ),
                    )
                }
                DbError::AlreadyExists { entity, user_id } => {
                    tracing::warn!(entity = %entity, user_id = %user_id, "Already exists");
                    (
                        StatusCode::CONFLICT,
                        ErrorResponse::with_details("Already exists", db_err.to_string()),
                    )
                }
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorResponse::with_details("Database error", db_err.to_string()),
                    )
                }
            },
            ApiError::AnalysisUnavailable(msg) => {
                tracing::warn!(message = %msg, "Analysis unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::with_details("Analysis unavailable", msg.clone()),
                )
            }
            ApiError::BatchRunning => {
                tracing::warn!("Daily analysis already running");
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("Daily analysis already running"),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Bad request", msg.clone()),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
