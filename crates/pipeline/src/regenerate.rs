//! Regeneration of a single already-generated day.
//!
//! Works from the caller's frozen intake and approved plan, never from
//! the progress row: the run's pointer and status are untouched, and the
//! only side effect is one broadcast. Attached sessions replace the day
//! via upsert; the stored artifacts keep the original until the caller
//! decides otherwise.

use daybreak_core::intake::SprintIntake;
use daybreak_core::lesson::DayArtifacts;
use daybreak_core::plan::MasterPlan;
use daybreak_events::{ChannelRegistry, SprintEvent};
use daybreak_llm::ContentGenerator;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::PipelineError;

pub async fn regenerate_day(
    content: &ContentGenerator,
    registry: &ChannelRegistry,
    intake: &SprintIntake,
    master_plan: &MasterPlan,
    day: u32,
    channel_name: &str,
) -> Result<DayArtifacts, PipelineError> {
    intake.ensure_valid()?;
    let day_plan = master_plan.day(day).ok_or_else(|| {
        PipelineError::Invalid(format!("masterPlan has no entry for day {day}"))
    })?;

    // Regeneration is synchronous and short; it gets no cancel hook.
    let token = CancellationToken::new();
    let artifacts = content
        .generate_day(intake, day_plan, master_plan.total_days(), &token)
        .await
        .map_err(|source| PipelineError::DayFailed { day, source })?;

    registry
        .publish(
            channel_name,
            SprintEvent::LessonGenerated {
                lesson: artifacts.lesson.clone(),
                email: artifacts.email.clone(),
            },
        )
        .await;
    info!(day, channel = channel_name, "day regenerated");
    Ok(artifacts)
}
