//! In-memory [`ProgressStore`] used by tests and local development.
//!
//! Mirrors the Postgres implementation's transition semantics exactly,
//! including the conditional terminal writes, so pipeline tests exercise
//! the same state machine without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use daybreak_core::lesson::DayArtifacts;
use daybreak_core::DbId;
use tokio::sync::Mutex;

use crate::models::progress::{GenerationProgress, NewGenerationProgress};
use crate::models::status::RunStatus;
use crate::store::{ProgressStore, StoreError};

#[derive(Default)]
struct Inner {
    runs: HashMap<DbId, GenerationProgress>,
    days: HashMap<DbId, Vec<DayArtifacts>>,
    next_id: DbId,
}

#[derive(Default)]
pub struct MemoryProgressStore {
    inner: Mutex<Inner>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn get_mut<'a>(
    runs: &'a mut HashMap<DbId, GenerationProgress>,
    id: DbId,
) -> Result<&'a mut GenerationProgress, StoreError> {
    runs.get_mut(&id).ok_or(StoreError::NotFound(id))
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn create(&self, new: NewGenerationProgress) -> Result<GenerationProgress, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        let progress = GenerationProgress {
            id,
            sprint_id: new.sprint_id,
            channel_name: new.channel_name,
            total_days: new.master_plan.total_days(),
            current_day: 1,
            status: RunStatus::Pending,
            intake: new.intake,
            master_plan: new.master_plan,
            error_message: None,
            created_at: now,
            updated_at: now,
        };
        inner.runs.insert(id, progress.clone());
        inner.days.insert(id, Vec::new());
        Ok(progress)
    }

    async fn find(&self, id: DbId) -> Result<GenerationProgress, StoreError> {
        let inner = self.inner.lock().await;
        inner.runs.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn claim(&self, id: DbId) -> Result<GenerationProgress, StoreError> {
        let mut inner = self.inner.lock().await;
        let run = get_mut(&mut inner.runs, id)?;
        if !run.status.is_claimable() {
            return Err(StoreError::NotClaimable {
                id,
                status: run.status.label(),
            });
        }
        run.status = RunStatus::Generating;
        run.error_message = None;
        run.updated_at = Utc::now();
        Ok(run.clone())
    }

    async fn advance_day(&self, id: DbId, next_day: u32) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let run = get_mut(&mut inner.runs, id)?;
        if next_day > run.current_day {
            run.current_day = next_day;
            run.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn release_to_pending(&self, id: DbId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let run = get_mut(&mut inner.runs, id)?;
        if run.status != RunStatus::Generating {
            return Ok(false);
        }
        run.status = RunStatus::Pending;
        run.updated_at = Utc::now();
        Ok(true)
    }

    async fn mark_completed(&self, id: DbId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let run = get_mut(&mut inner.runs, id)?;
        if run.status != RunStatus::Generating {
            return Ok(false);
        }
        run.status = RunStatus::Completed;
        run.error_message = None;
        run.updated_at = Utc::now();
        Ok(true)
    }

    async fn mark_failed(&self, id: DbId, message: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let run = get_mut(&mut inner.runs, id)?;
        if run.status != RunStatus::Generating {
            return Ok(false);
        }
        run.status = RunStatus::Failed;
        run.error_message = Some(message.to_string());
        run.updated_at = Utc::now();
        Ok(true)
    }

    async fn request_cancel(&self, id: DbId) -> Result<GenerationProgress, StoreError> {
        let mut inner = self.inner.lock().await;
        let run = get_mut(&mut inner.runs, id)?;
        if !run.status.is_terminal() {
            run.status = RunStatus::Cancelled;
            run.updated_at = Utc::now();
        }
        Ok(run.clone())
    }

    async fn save_day(&self, id: DbId, artifacts: &DayArtifacts) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.runs.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        let days = inner.days.entry(id).or_default();
        match days.iter_mut().find(|d| d.day == artifacts.day) {
            Some(existing) => *existing = artifacts.clone(),
            None => {
                days.push(artifacts.clone());
                days.sort_by_key(|d| d.day);
            }
        }
        Ok(())
    }

    async fn list_days(&self, id: DbId) -> Result<Vec<DayArtifacts>, StoreError> {
        let inner = self.inner.lock().await;
        if !inner.runs.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        Ok(inner.days.get(&id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use daybreak_core::intake::SprintIntake;
    use daybreak_core::lesson::{DailyEmail, DailyLesson};
    use daybreak_core::plan::{DayPlan, MasterPlan};

    fn plan(days: u32) -> MasterPlan {
        MasterPlan {
            overview: Default::default(),
            days: (1..=days)
                .map(|day| DayPlan {
                    day,
                    theme: format!("Theme {day}"),
                    objective: format!("Objective {day}"),
                    key_takeaways: vec![],
                    building_blocks: String::new(),
                    connections: Default::default(),
                })
                .collect(),
        }
    }

    fn intake() -> SprintIntake {
        serde_json::from_value(serde_json::json!({
            "creatorName": "Dana",
            "creatorEmail": "dana@example.com",
            "title": "Morning Momentum",
            "description": "Build a durable morning routine.",
            "durationDays": 7,
        }))
        .unwrap()
    }

    fn artifacts(day: u32, tag: &str) -> DayArtifacts {
        DayArtifacts {
            day,
            lesson: DailyLesson {
                day,
                title: format!("Lesson {day} {tag}"),
                content: "content".into(),
                exercise: String::new(),
                affirmation: String::new(),
            },
            email: DailyEmail {
                day,
                subject: format!("Subject {day} {tag}"),
                content: "email".into(),
            },
        }
    }

    async fn seeded(days: u32) -> (MemoryProgressStore, DbId) {
        let store = MemoryProgressStore::new();
        let run = store
            .create(NewGenerationProgress {
                sprint_id: "sprint-1".into(),
                channel_name: "sprint-1-progress".into(),
                intake: intake(),
                master_plan: plan(days),
            })
            .await
            .unwrap();
        (store, run.id)
    }

    // --- Test: creation seeds a pending run at day 1 ---

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let (store, id) = seeded(7).await;
        let run = store.find(id).await.unwrap();
        assert_eq!(run.status, RunStatus::Pending);
        assert_eq!(run.current_day, 1);
        assert_eq!(run.total_days, 7);
        assert_eq!(run.generated_count(), 0);
    }

    #[tokio::test]
    async fn find_unknown_id_is_not_found() {
        let store = MemoryProgressStore::new();
        assert_matches!(store.find(42).await, Err(StoreError::NotFound(42)));
    }

    // --- Test: claim is a compare-and-set ---

    #[tokio::test]
    async fn second_claim_is_rejected_while_generating() {
        let (store, id) = seeded(7).await;
        store.claim(id).await.unwrap();
        assert_matches!(
            store.claim(id).await,
            Err(StoreError::NotClaimable { status: "generating", .. })
        );
    }

    #[tokio::test]
    async fn failed_run_can_be_reclaimed_and_error_clears() {
        let (store, id) = seeded(7).await;
        store.claim(id).await.unwrap();
        assert!(store.mark_failed(id, "provider refused").await.unwrap());

        let run = store.claim(id).await.unwrap();
        assert_eq!(run.status, RunStatus::Generating);
        assert_eq!(run.error_message, None);
    }

    #[tokio::test]
    async fn terminal_runs_cannot_be_claimed() {
        let (store, id) = seeded(7).await;
        store.request_cancel(id).await.unwrap();
        assert_matches!(
            store.claim(id).await,
            Err(StoreError::NotClaimable { status: "cancelled", .. })
        );
    }

    // --- Test: pointer only moves forward ---

    #[tokio::test]
    async fn stale_advance_is_ignored() {
        let (store, id) = seeded(7).await;
        store.advance_day(id, 4).await.unwrap();
        store.advance_day(id, 2).await.unwrap();
        assert_eq!(store.find(id).await.unwrap().current_day, 4);
        assert_eq!(store.find(id).await.unwrap().generated_count(), 3);
    }

    // --- Test: save_day upserts by (run, day) ---

    #[tokio::test]
    async fn saving_a_day_twice_keeps_one_row_with_newest_content() {
        let (store, id) = seeded(7).await;
        store.save_day(id, &artifacts(2, "first")).await.unwrap();
        store.save_day(id, &artifacts(1, "first")).await.unwrap();
        store.save_day(id, &artifacts(2, "second")).await.unwrap();

        let days = store.list_days(id).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, 1);
        assert_eq!(days[1].day, 2);
        assert_eq!(days[1].lesson.title, "Lesson 2 second");
    }

    #[tokio::test]
    async fn save_day_for_unknown_run_is_not_found() {
        let store = MemoryProgressStore::new();
        assert_matches!(
            store.save_day(9, &artifacts(1, "x")).await,
            Err(StoreError::NotFound(9))
        );
    }

    // --- Test: terminal writes are conditional on generating ---

    #[tokio::test]
    async fn cancel_beats_completion_of_the_final_day() {
        let (store, id) = seeded(7).await;
        store.claim(id).await.unwrap();
        store.request_cancel(id).await.unwrap();

        assert!(!store.mark_completed(id).await.unwrap());
        assert_eq!(store.find(id).await.unwrap().status, RunStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_is_a_noop_on_completed_runs() {
        let (store, id) = seeded(7).await;
        store.claim(id).await.unwrap();
        store.advance_day(id, 8).await.unwrap();
        assert!(store.mark_completed(id).await.unwrap());

        let run = store.request_cancel(id).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn release_applies_only_while_generating() {
        let (store, id) = seeded(7).await;
        assert!(!store.release_to_pending(id).await.unwrap());

        store.claim(id).await.unwrap();
        assert!(store.release_to_pending(id).await.unwrap());
        assert_eq!(store.find(id).await.unwrap().status, RunStatus::Pending);
    }
}
