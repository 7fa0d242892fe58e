//! Batch orchestration: claim, generate a bounded window of days with a
//! checkpoint after each, then hand the run back.
//!
//! Each invocation is independently resumable. The progress row's
//! `current_day` pointer is the only cursor; everything else (broadcast,
//! in-memory state) is rebuildable from it and the saved days.

use std::sync::Arc;
use std::time::Duration;

use daybreak_core::batch::{BatchWindow, DEFAULT_BATCH_SIZE};
use daybreak_core::intake::SprintIntake;
use daybreak_core::plan::MasterPlan;
use daybreak_core::DbId;
use daybreak_db::models::progress::{GenerationProgress, NewGenerationProgress};
use daybreak_db::{ProgressStore, RunStatus};
use daybreak_events::{ChannelRegistry, SprintEvent};
use daybreak_llm::{ContentGenerator, PlanGenerator};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;

/// Result of one batch-advance invocation, in the shape callers receive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Inclusive range generated this call, e.g. `"1-4"`. `None` when no
    /// day was generated.
    pub days_generated: Option<String>,
    /// Day the next invocation starts at. `None` once the run is done or
    /// dead.
    pub next_day: Option<u32>,
    pub is_complete: bool,
    /// Days generated by this call alone.
    pub generated_count: u32,
}

/// Tuning for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub batch_size: u32,
    /// Pause between consecutive days inside one batch.
    pub day_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            day_delay: Duration::from_secs(1),
        }
    }
}

/// Drives generation runs against the store, the broadcast registry, and
/// the content generator.
#[derive(Clone)]
pub struct BatchOrchestrator {
    store: Arc<dyn ProgressStore>,
    registry: ChannelRegistry,
    plans: PlanGenerator,
    content: ContentGenerator,
    config: OrchestratorConfig,
}

impl BatchOrchestrator {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        registry: ChannelRegistry,
        plans: PlanGenerator,
        content: ContentGenerator,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            registry,
            plans,
            content,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Master plan phase
    // ------------------------------------------------------------------

    /// Generate the plan structure for an intake, narrating progress on
    /// `channel_name`. Nothing is persisted; the caller reviews the plan
    /// and submits it back to [`start_run`](Self::start_run).
    pub async fn generate_master_plan(
        &self,
        intake: &SprintIntake,
        channel_name: &str,
    ) -> Result<MasterPlan, PipelineError> {
        intake.ensure_valid()?;

        self.registry
            .publish(channel_name, SprintEvent::StructureGenerationStarted)
            .await;

        let plan = self
            .plans
            .generate(intake)
            .await
            .map_err(PipelineError::PlanFailed)?;

        self.registry
            .publish(
                channel_name,
                SprintEvent::StructureGenerated {
                    structure: plan.clone(),
                },
            )
            .await;
        Ok(plan)
    }

    // ------------------------------------------------------------------
    // Content phase
    // ------------------------------------------------------------------

    /// Persist a fresh pending run for an approved plan. Returns the row
    /// the caller acknowledges with; generation starts with the first
    /// [`advance`](Self::advance).
    pub async fn start_run(
        &self,
        intake: SprintIntake,
        master_plan: MasterPlan,
        sprint_id: String,
        channel_name: String,
    ) -> Result<GenerationProgress, PipelineError> {
        intake.ensure_valid()?;
        master_plan.validate_contiguity()?;
        if master_plan.total_days() != intake.duration_days {
            return Err(PipelineError::Invalid(format!(
                "master plan has {} days, intake requires {}",
                master_plan.total_days(),
                intake.duration_days
            )));
        }

        let run = self
            .store
            .create(NewGenerationProgress {
                sprint_id,
                channel_name,
                intake,
                master_plan,
            })
            .await?;
        info!(run = run.id, days = run.total_days, "generation run created");
        Ok(run)
    }

    /// One bounded batch: claim the run, generate days from the pointer
    /// until the window closes or something stops it, checkpoint each day.
    pub async fn advance(
        &self,
        progress_id: DbId,
        batch_size: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, PipelineError> {
        let run = self.store.find(progress_id).await?;
        match run.status {
            // Advancing a finished run is an explicit no-op.
            RunStatus::Completed => {
                return Ok(BatchOutcome {
                    days_generated: None,
                    next_day: None,
                    is_complete: true,
                    generated_count: 0,
                });
            }
            RunStatus::Cancelled => return Err(PipelineError::Cancelled { id: progress_id }),
            RunStatus::Generating => {
                return Err(PipelineError::AlreadyRunning { id: progress_id })
            }
            RunStatus::Pending | RunStatus::Failed => {}
        }

        let run = self.store.claim(progress_id).await?;
        let batch = batch_size.unwrap_or(self.config.batch_size);
        let result = self.run_window(&run, batch, cancel).await;

        // A day failure wrote its own status; anything else would leave
        // the claim dangling, so record it as a failure too.
        if let Err(err) = &result {
            if !matches!(err, PipelineError::DayFailed { .. }) {
                if let Err(store_err) = self.store.mark_failed(run.id, &err.to_string()).await {
                    error!(run = run.id, error = %store_err, "could not record batch failure");
                }
            }
        }
        result
    }

    /// Drive a run to a terminal state through repeated batches.
    ///
    /// This is the detached background mode: the caller has already been
    /// acknowledged, so outcomes are reported only through the store and
    /// the broadcast channel.
    pub async fn run_to_completion(
        &self,
        progress_id: DbId,
        batch_size: Option<u32>,
        cancel: CancellationToken,
    ) {
        loop {
            match self.advance(progress_id, batch_size, &cancel).await {
                Ok(outcome) if outcome.is_complete => return,
                Ok(outcome) => {
                    if outcome.next_day.is_none() || cancel.is_cancelled() {
                        return;
                    }
                }
                Err(err) => {
                    warn!(run = progress_id, error = %err, "background run halted");
                    return;
                }
            }
        }
    }

    async fn run_window(
        &self,
        run: &GenerationProgress,
        batch_size: u32,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, PipelineError> {
        let Some(window) = BatchWindow::compute(run.current_day, batch_size, run.total_days)
        else {
            // Pointer already past the end: the previous invocation died
            // between its last checkpoint and the terminal write.
            return self.finish(run).await;
        };
        info!(run = run.id, window = %window.label(), "batch started");

        let mut generated = 0u32;
        for day in window.days() {
            if cancel.is_cancelled() {
                return self.suspend(run, &window, day, generated).await;
            }
            let current = self.store.find(run.id).await?;
            if current.status == RunStatus::Cancelled {
                info!(run = run.id, day, "cancel observed at day boundary");
                return Ok(BatchOutcome {
                    days_generated: completed_label(&window, day),
                    next_day: None,
                    is_complete: false,
                    generated_count: generated,
                });
            }

            let day_plan = run
                .master_plan
                .day(day)
                .ok_or(PipelineError::UnknownDay { id: run.id, day })?;

            match self
                .content
                .generate_day(&run.intake, day_plan, run.total_days, cancel)
                .await
            {
                Ok(artifacts) => {
                    // Durable first, broadcast second, pointer last:
                    // a crash at any point keeps the run resumable
                    // without losing a saved day.
                    self.store.save_day(run.id, &artifacts).await?;
                    self.registry
                        .publish(
                            &run.channel_name,
                            SprintEvent::LessonGenerated {
                                lesson: artifacts.lesson,
                                email: artifacts.email,
                            },
                        )
                        .await;
                    self.store.advance_day(run.id, day + 1).await?;
                    generated += 1;
                    debug!(run = run.id, day, "day checkpointed");
                }
                Err(err) => {
                    warn!(run = run.id, day, error = %err, "day failed, halting batch");
                    let message = err.to_string();
                    self.store.mark_failed(run.id, &message).await?;
                    self.registry
                        .publish(
                            &run.channel_name,
                            SprintEvent::GenerationError {
                                day,
                                error: message,
                            },
                        )
                        .await;
                    return Err(PipelineError::DayFailed { day, source: err });
                }
            }

            if day < window.end {
                self.pace(cancel).await;
            }
        }

        let next = window.end + 1;
        if next > run.total_days {
            let mut outcome = self.finish(run).await?;
            outcome.days_generated = Some(window.label());
            outcome.generated_count = generated;
            Ok(outcome)
        } else {
            self.store.release_to_pending(run.id).await?;
            Ok(BatchOutcome {
                days_generated: Some(window.label()),
                next_day: Some(next),
                is_complete: false,
                generated_count: generated,
            })
        }
    }

    /// Terminal write plus the completion broadcast, but only if the run
    /// is still ours: a user cancel racing the final day wins, and no
    /// completion event goes out for a cancelled run.
    async fn finish(&self, run: &GenerationProgress) -> Result<BatchOutcome, PipelineError> {
        let completed = self.store.mark_completed(run.id).await?;
        if completed {
            info!(run = run.id, "run completed");
            self.registry
                .publish(
                    &run.channel_name,
                    SprintEvent::GenerationComplete {
                        sprint_id: run.sprint_id.clone(),
                    },
                )
                .await;
        }
        Ok(BatchOutcome {
            days_generated: None,
            next_day: None,
            is_complete: completed,
            generated_count: 0,
        })
    }

    /// Shutdown path: put the claim back so a later invocation resumes at
    /// `day`. Distinct from a user cancel, which is terminal.
    async fn suspend(
        &self,
        run: &GenerationProgress,
        window: &BatchWindow,
        day: u32,
        generated: u32,
    ) -> Result<BatchOutcome, PipelineError> {
        self.store.release_to_pending(run.id).await?;
        info!(run = run.id, day, "shutdown requested, run released for resume");
        Ok(BatchOutcome {
            days_generated: completed_label(window, day),
            next_day: Some(day),
            is_complete: false,
            generated_count: generated,
        })
    }

    async fn pace(&self, cancel: &CancellationToken) {
        let delay = self.config.day_delay;
        if delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Label for the days a partial window actually produced before stopping
/// at `stopped_at`.
fn completed_label(window: &BatchWindow, stopped_at: u32) -> Option<String> {
    (stopped_at > window.start).then(|| format!("{}-{}", window.start, stopped_at - 1))
}
