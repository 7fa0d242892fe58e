//! Handlers for the `/runs` resource.
//!
//! `advance` is the caller-driven batch trigger; the GET endpoints back
//! the two-phase resume (row first for orientation, days for the bulk
//! fetch). Cancellation is a status write the orchestrator observes at
//! its next day boundary.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use daybreak_core::{DbId, Timestamp};
use daybreak_db::models::progress::GenerationProgress;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Progress row as exposed over HTTP. The frozen intake and plan are
/// omitted; resume clients get the plan from `structure-generated` or
/// already hold it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunView {
    pub id: DbId,
    pub sprint_id: String,
    pub channel_name: String,
    pub total_days: u32,
    pub current_day: u32,
    pub status: &'static str,
    pub generated_count: u32,
    pub is_complete: bool,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<GenerationProgress> for RunView {
    fn from(run: GenerationProgress) -> Self {
        Self {
            generated_count: run.generated_count(),
            is_complete: run.is_complete(),
            id: run.id,
            sprint_id: run.sprint_id,
            channel_name: run.channel_name,
            total_days: run.total_days,
            current_day: run.current_day,
            status: run.status.label(),
            error_message: run.error_message,
            created_at: run.created_at,
            updated_at: run.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Advance
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceRequest {
    pub progress_id: DbId,
    /// Days to attempt this call; server default when omitted.
    #[serde(default)]
    pub batch_size: Option<u32>,
}

/// POST /api/v1/runs/advance
///
/// Run one bounded batch synchronously and return the outcome bare (the
/// `{daysGenerated, nextDay, isComplete, generatedCount}` contract
/// shape). Advancing a completed run is a no-op with `isComplete: true`.
pub async fn advance_run(
    State(state): State<AppState>,
    Json(input): Json<AdvanceRequest>,
) -> AppResult<impl IntoResponse> {
    if input.batch_size == Some(0) {
        return Err(AppError::BadRequest("batchSize must be at least 1".into()));
    }

    let outcome = state
        .orchestrator
        .advance(input.progress_id, input.batch_size, &state.shutdown)
        .await?;

    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// GET /api/v1/runs/{id}
///
/// Fetch the progress row. A resuming client calls this to learn the
/// channel name, pointer, and status before attaching.
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let run = state.store.find(id).await?;
    Ok(Json(DataResponse {
        data: RunView::from(run),
    }))
}

/// GET /api/v1/runs/{id}/days
///
/// List the persisted day artifacts in day order: the bulk-fetch half of
/// two-phase resume. 404 for an unknown run rather than an empty list.
pub async fn list_run_days(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.store.find(id).await?;
    let days = state.store.list_days(id).await?;
    Ok(Json(DataResponse { data: days }))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/v1/runs/{id}/cancel
///
/// Request cancellation. An active batch stops at its next day boundary;
/// completed work stays persisted. Cancelling a run that already reached
/// a terminal state leaves it unchanged, and the returned view shows
/// which status won.
pub async fn cancel_run(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let run = state.store.request_cancel(id).await?;

    tracing::info!(progress_id = id, status = run.status.label(), "Run cancellation requested");

    Ok(Json(DataResponse {
        data: RunView::from(run),
    }))
}
