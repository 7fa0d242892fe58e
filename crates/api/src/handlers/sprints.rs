//! Handlers for the `/sprints` resource.
//!
//! The master-plan and regeneration endpoints are synchronous: the caller
//! waits for the generator. The content phase is not -- it acknowledges
//! immediately and hands the run to a detached background driver that
//! reports through the broadcast channel and the progress store.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use daybreak_core::intake::SprintIntake;
use daybreak_core::plan::MasterPlan;
use daybreak_core::DbId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Master plan
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterPlanRequest {
    pub form_data: SprintIntake,
    /// Channel the structure events are narrated on.
    pub channel_name: String,
}

/// POST /api/v1/sprints/master-plan
///
/// Generate a day-by-day curriculum outline from the intake. Publishes
/// `structure-generation-started` and `structure-generated` on the given
/// channel. Nothing is persisted; the caller reviews the plan and submits
/// it back via `/sprints/generate`.
pub async fn generate_master_plan(
    State(state): State<AppState>,
    Json(input): Json<MasterPlanRequest>,
) -> AppResult<impl IntoResponse> {
    let plan = state
        .orchestrator
        .generate_master_plan(&input.form_data, &input.channel_name)
        .await?;

    tracing::info!(
        channel = %input.channel_name,
        days = plan.total_days(),
        "Master plan generated",
    );

    Ok(Json(DataResponse { data: plan }))
}

// ---------------------------------------------------------------------------
// Content phase
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Caller-supplied sprint identifier; generated when omitted.
    #[serde(default)]
    pub sprint_id: Option<String>,
    pub form_data: SprintIntake,
    /// The approved plan, frozen into the progress row as-is.
    pub master_plan: MasterPlan,
    /// Defaults to `sprint-{sprintId}-progress` when omitted.
    #[serde(default)]
    pub channel_name: Option<String>,
}

/// Immediate acknowledgement for a started run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAck {
    pub progress_id: DbId,
    pub sprint_id: String,
    pub channel_name: String,
}

/// POST /api/v1/sprints/generate
///
/// Create the progress row for an approved plan and start generating.
/// Returns 202 with the ack as soon as the row exists; days arrive on the
/// broadcast channel while the background driver works through batches.
pub async fn generate_sprint(
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let sprint_id = input
        .sprint_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let channel_name = input
        .channel_name
        .unwrap_or_else(|| format!("sprint-{sprint_id}-progress"));

    let run = state
        .orchestrator
        .start_run(
            input.form_data,
            input.master_plan,
            sprint_id.clone(),
            channel_name.clone(),
        )
        .await?;

    // Detached driver: outcomes reach the caller only through the channel
    // and the progress row. The tracker lets shutdown wait for the run to
    // checkpoint and release.
    let orchestrator = state.orchestrator.clone();
    let cancel = state.shutdown.clone();
    let progress_id = run.id;
    state.tasks.spawn(async move {
        orchestrator.run_to_completion(progress_id, None, cancel).await;
    });

    tracing::info!(
        progress_id,
        sprint_id = %sprint_id,
        channel = %channel_name,
        days = run.total_days,
        "Generation run started",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: GenerateAck {
                progress_id,
                sprint_id,
                channel_name,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Regeneration
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    pub regenerate_day: u32,
    pub form_data: SprintIntake,
    pub master_plan: MasterPlan,
    pub channel_name: String,
}

/// POST /api/v1/sprints/regenerate-day
///
/// Regenerate one day from the frozen intake and approved plan, publish a
/// single `lesson-generated` event, and return the artifacts bare (the
/// `{day, lesson, email}` contract shape). No progress row is read or
/// written.
pub async fn regenerate_day(
    State(state): State<AppState>,
    Json(input): Json<RegenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let artifacts = daybreak_pipeline::regenerate_day(
        &state.content,
        &state.registry,
        &input.form_data,
        &input.master_plan,
        input.regenerate_day,
        &input.channel_name,
    )
    .await?;

    Ok(Json(artifacts))
}
