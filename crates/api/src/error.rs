use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use daybreak_db::StoreError;
use daybreak_pipeline::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PipelineError`] for generation failures and [`StoreError`] for
/// run lookups that bypass the pipeline. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A generation pipeline error from `daybreak_pipeline`.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A progress store error reaching the surface outside a pipeline call.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            // --- Pipeline errors ---
            AppError::Pipeline(err) => match err {
                PipelineError::ProgressNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Progress record {id} not found"),
                    None,
                ),
                PipelineError::AlreadyRunning { .. } => (
                    StatusCode::CONFLICT,
                    "ALREADY_RUNNING",
                    err.to_string(),
                    None,
                ),
                PipelineError::Cancelled { .. } => {
                    (StatusCode::CONFLICT, "RUN_CANCELLED", err.to_string(), None)
                }
                PipelineError::Invalid(msg) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                    None,
                ),
                PipelineError::PlanFailed(source) => (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "Master plan generation failed".to_string(),
                    Some(source.to_string()),
                ),
                PipelineError::DayFailed { day, source } => (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    format!("Day {day} generation failed"),
                    Some(source.to_string()),
                ),
                PipelineError::UnknownDay { .. } | PipelineError::Store(_) => {
                    tracing::error!(error = %err, "Internal pipeline error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                        None,
                    )
                }
            },

            // --- Store errors ---
            AppError::Store(err) => match err {
                StoreError::NotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Progress record {id} not found"),
                    None,
                ),
                StoreError::NotClaimable { .. } => {
                    (StatusCode::CONFLICT, "CONFLICT", err.to_string(), None)
                }
                StoreError::Database(db_err) => classify_sqlx_error(db_err),
                StoreError::Snapshot(_) | StoreError::Corrupt(_) => {
                    tracing::error!(error = %err, "Stored run state unreadable");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                        None,
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String, Option<String>) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                        None,
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            )
        }
    }
}
