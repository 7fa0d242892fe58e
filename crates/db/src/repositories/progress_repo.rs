//! Postgres-backed [`ProgressStore`].
//!
//! Transitions are expressed as conditional `UPDATE`s so concurrent
//! invocations and user cancels race safely inside the database rather
//! than in application locks.

use async_trait::async_trait;
use daybreak_core::lesson::DayArtifacts;
use daybreak_core::DbId;
use sqlx::PgPool;

use crate::models::progress::{
    DayRow, GenerationProgress, NewGenerationProgress, ProgressRow,
};
use crate::models::status::RunStatus;
use crate::store::{ProgressStore, StoreError};

const COLUMNS: &str = "id, sprint_id, channel_name, total_days, current_day, status_id, \
                       form_data, master_plan, error_message, created_at, updated_at";

const DAY_COLUMNS: &str = "id, progress_id, day, lesson, email, created_at, updated_at";

#[derive(Clone)]
pub struct PgProgressStore {
    pool: PgPool,
}

impl PgProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: DbId) -> Result<ProgressRow, StoreError> {
        sqlx::query_as::<_, ProgressRow>(&format!(
            "SELECT {COLUMNS} FROM generation_progress WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn create(&self, new: NewGenerationProgress) -> Result<GenerationProgress, StoreError> {
        let form_data = serde_json::to_value(&new.intake)?;
        let plan = serde_json::to_value(&new.master_plan)?;
        let row = sqlx::query_as::<_, ProgressRow>(&format!(
            "INSERT INTO generation_progress \
                 (sprint_id, channel_name, total_days, form_data, master_plan) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        ))
        .bind(&new.sprint_id)
        .bind(&new.channel_name)
        .bind(new.master_plan.total_days() as i32)
        .bind(form_data)
        .bind(plan)
        .fetch_one(&self.pool)
        .await?;
        row.into_domain()
    }

    async fn find(&self, id: DbId) -> Result<GenerationProgress, StoreError> {
        self.fetch(id).await?.into_domain()
    }

    async fn claim(&self, id: DbId) -> Result<GenerationProgress, StoreError> {
        let claimed = sqlx::query_as::<_, ProgressRow>(&format!(
            "UPDATE generation_progress \
             SET status_id = $1, error_message = NULL, updated_at = NOW() \
             WHERE id = $2 AND status_id IN ($3, $4) \
             RETURNING {COLUMNS}"
        ))
        .bind(RunStatus::Generating.id())
        .bind(id)
        .bind(RunStatus::Pending.id())
        .bind(RunStatus::Failed.id())
        .fetch_optional(&self.pool)
        .await?;

        match claimed {
            Some(row) => row.into_domain(),
            None => {
                // Lost the race or the run is terminal. Report which.
                let current = self.find(id).await?;
                Err(StoreError::NotClaimable {
                    id,
                    status: current.status.label(),
                })
            }
        }
    }

    async fn advance_day(&self, id: DbId, next_day: u32) -> Result<(), StoreError> {
        // Monotonic guard: a stale advance with the same or a lower day
        // matches no row and is a no-op.
        sqlx::query(
            "UPDATE generation_progress \
             SET current_day = $1, updated_at = NOW() \
             WHERE id = $2 AND current_day < $1",
        )
        .bind(next_day as i32)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn release_to_pending(&self, id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE generation_progress \
             SET status_id = $1, updated_at = NOW() \
             WHERE id = $2 AND status_id = $3",
        )
        .bind(RunStatus::Pending.id())
        .bind(id)
        .bind(RunStatus::Generating.id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_completed(&self, id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE generation_progress \
             SET status_id = $1, error_message = NULL, updated_at = NOW() \
             WHERE id = $2 AND status_id = $3",
        )
        .bind(RunStatus::Completed.id())
        .bind(id)
        .bind(RunStatus::Generating.id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_failed(&self, id: DbId, message: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE generation_progress \
             SET status_id = $1, error_message = $2, updated_at = NOW() \
             WHERE id = $3 AND status_id = $4",
        )
        .bind(RunStatus::Failed.id())
        .bind(message)
        .bind(id)
        .bind(RunStatus::Generating.id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn request_cancel(&self, id: DbId) -> Result<GenerationProgress, StoreError> {
        let cancelled = sqlx::query_as::<_, ProgressRow>(&format!(
            "UPDATE generation_progress \
             SET status_id = $1, updated_at = NOW() \
             WHERE id = $2 AND status_id NOT IN ($3, $4) \
             RETURNING {COLUMNS}"
        ))
        .bind(RunStatus::Cancelled.id())
        .bind(id)
        .bind(RunStatus::Completed.id())
        .bind(RunStatus::Cancelled.id())
        .fetch_optional(&self.pool)
        .await?;

        match cancelled {
            Some(row) => row.into_domain(),
            // Already terminal; cancelling is a no-op.
            None => self.find(id).await,
        }
    }

    async fn save_day(&self, id: DbId, artifacts: &DayArtifacts) -> Result<(), StoreError> {
        let lesson = serde_json::to_value(&artifacts.lesson)?;
        let email = serde_json::to_value(&artifacts.email)?;
        sqlx::query(
            "INSERT INTO daily_content (progress_id, day, lesson, email) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (progress_id, day) \
             DO UPDATE SET lesson = EXCLUDED.lesson, email = EXCLUDED.email, \
                           updated_at = NOW()",
        )
        .bind(id)
        .bind(artifacts.day as i32)
        .bind(lesson)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_days(&self, id: DbId) -> Result<Vec<DayArtifacts>, StoreError> {
        let rows = sqlx::query_as::<_, DayRow>(&format!(
            "SELECT {DAY_COLUMNS} FROM daily_content WHERE progress_id = $1 ORDER BY day"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(DayRow::into_artifacts).collect()
    }
}
