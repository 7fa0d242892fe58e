use daybreak_core::{CoreError, DbId};
use daybreak_db::StoreError;
use daybreak_llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Progress record not found: {0}")]
    ProgressNotFound(DbId),

    /// Another invocation holds the claim on this run.
    #[error("Run {id} already has an active batch invocation")]
    AlreadyRunning { id: DbId },

    /// The run was cancelled; it will never accept another batch.
    #[error("Run {id} was cancelled")]
    Cancelled { id: DbId },

    #[error("Validation failed: {0}")]
    Invalid(String),

    /// The master plan could not be generated. Nothing was persisted.
    #[error("Master plan generation failed: {0}")]
    PlanFailed(LlmError),

    /// The plan lost a day it should have. Points at data corruption, not
    /// a transient fault.
    #[error("Plan for run {id} has no entry for day {day}")]
    UnknownDay { id: DbId, day: u32 },

    /// Generation halted at `day`. The pointer stays pinned there so the
    /// next invocation retries this exact day.
    #[error("Day {day} failed: {source}")]
    DayFailed { day: u32, source: LlmError },

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        // Keep the bare reason so the surface message carries one
        // "Validation failed" prefix, not two.
        let CoreError::Validation(msg) = err;
        Self::Invalid(msg)
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::ProgressNotFound(id),
            StoreError::NotClaimable {
                id,
                status: "cancelled",
            } => Self::Cancelled { id },
            StoreError::NotClaimable { id, .. } => Self::AlreadyRunning { id },
            other => Self::Store(other),
        }
    }
}
