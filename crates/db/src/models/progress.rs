//! Domain and row types for generation runs and their per-day output.

use daybreak_core::intake::SprintIntake;
use daybreak_core::lesson::DayArtifacts;
use daybreak_core::plan::MasterPlan;
use daybreak_core::{DbId, Timestamp};
use serde_json::Value;
use sqlx::FromRow;

use crate::models::status::RunStatus;
use crate::store::StoreError;

/// A generation run as the rest of the system sees it: snapshots already
/// deserialized, status already resolved.
#[derive(Debug, Clone)]
pub struct GenerationProgress {
    pub id: DbId,
    pub sprint_id: String,
    pub channel_name: String,
    pub total_days: u32,
    /// Next day to generate. Starts at 1 and only ever moves forward.
    pub current_day: u32,
    pub status: RunStatus,
    pub intake: SprintIntake,
    pub master_plan: MasterPlan,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GenerationProgress {
    /// Days actually produced so far, i.e. those behind the pointer.
    pub fn generated_count(&self) -> u32 {
        self.current_day.saturating_sub(1).min(self.total_days)
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Input for creating a fresh run. `total_days` is taken from the plan,
/// `current_day` starts at 1 and `status` at pending.
#[derive(Debug, Clone)]
pub struct NewGenerationProgress {
    pub sprint_id: String,
    pub channel_name: String,
    pub intake: SprintIntake,
    pub master_plan: MasterPlan,
}

/// Raw `generation_progress` row.
#[derive(Debug, Clone, FromRow)]
pub struct ProgressRow {
    pub id: i64,
    pub sprint_id: String,
    pub channel_name: String,
    pub total_days: i32,
    pub current_day: i32,
    pub status_id: i16,
    pub form_data: Value,
    pub master_plan: Value,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProgressRow {
    pub fn into_domain(self) -> Result<GenerationProgress, StoreError> {
        let status = RunStatus::from_id(self.status_id).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "progress {} has unknown status id {}",
                self.id, self.status_id
            ))
        })?;
        let intake: SprintIntake = serde_json::from_value(self.form_data)?;
        let master_plan: MasterPlan = serde_json::from_value(self.master_plan)?;
        Ok(GenerationProgress {
            id: self.id,
            sprint_id: self.sprint_id,
            channel_name: self.channel_name,
            total_days: self.total_days as u32,
            current_day: self.current_day as u32,
            status,
            intake,
            master_plan,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Raw `daily_content` row.
#[derive(Debug, Clone, FromRow)]
pub struct DayRow {
    pub id: i64,
    pub progress_id: i64,
    pub day: i32,
    pub lesson: Value,
    pub email: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DayRow {
    pub fn into_artifacts(self) -> Result<DayArtifacts, StoreError> {
        Ok(DayArtifacts {
            day: self.day as u32,
            lesson: serde_json::from_value(self.lesson)?,
            email: serde_json::from_value(self.email)?,
        })
    }
}
