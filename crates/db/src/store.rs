//! Durable progress store for generation runs.
//!
//! The store is the single source of truth for resumability: every day is
//! checkpointed before the in-memory pointer moves, so a process crash
//! loses at most the day currently being generated.

use async_trait::async_trait;
use daybreak_core::lesson::DayArtifacts;
use daybreak_core::DbId;
use thiserror::Error;

use crate::models::progress::{GenerationProgress, NewGenerationProgress};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Progress record not found: {0}")]
    NotFound(DbId),

    #[error("Progress record {id} cannot be claimed while {status}")]
    NotClaimable { id: DbId, status: &'static str },

    #[error("Snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Corrupt progress record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations a generation run needs.
///
/// The `bool`-returning transitions are conditional: they only apply while
/// the run is still `generating` and report whether the write landed. A
/// user cancel that races the final day therefore wins, and the caller can
/// see that it did.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Insert a fresh run in `pending` with the pointer at day 1.
    async fn create(&self, new: NewGenerationProgress) -> Result<GenerationProgress, StoreError>;

    async fn find(&self, id: DbId) -> Result<GenerationProgress, StoreError>;

    /// Compare-and-set claim: `pending` or `failed` becomes `generating`
    /// and any previous error message is cleared. Fails with
    /// [`StoreError::NotClaimable`] when another invocation holds the run
    /// or the run is terminal.
    async fn claim(&self, id: DbId) -> Result<GenerationProgress, StoreError>;

    /// Move the pointer to `next_day`. Monotonic: a stale write with the
    /// same or a lower day is a silent no-op.
    async fn advance_day(&self, id: DbId, next_day: u32) -> Result<(), StoreError>;

    /// `generating` back to `pending` on shutdown, so a later invocation
    /// can claim and resume. Returns whether the transition applied.
    async fn release_to_pending(&self, id: DbId) -> Result<bool, StoreError>;

    /// `generating` to `completed`, clearing any error. Returns whether
    /// the transition applied.
    async fn mark_completed(&self, id: DbId) -> Result<bool, StoreError>;

    /// `generating` to `failed` with the failure recorded. Returns whether
    /// the transition applied.
    async fn mark_failed(&self, id: DbId, message: &str) -> Result<bool, StoreError>;

    /// User-requested cancel. Applies from any non-terminal status and is
    /// a no-op on `completed` or `cancelled`; either way the current
    /// record is returned.
    async fn request_cancel(&self, id: DbId) -> Result<GenerationProgress, StoreError>;

    /// Upsert one day's artifacts, keyed by `(run, day)`. Saving the same
    /// day twice keeps exactly one row with the newest content.
    async fn save_day(&self, id: DbId, artifacts: &DayArtifacts) -> Result<(), StoreError>;

    /// All saved days for a run, ordered by day number.
    async fn list_days(&self, id: DbId) -> Result<Vec<DayArtifacts>, StoreError>;
}
