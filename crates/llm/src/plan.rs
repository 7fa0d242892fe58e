//! Master plan generation.

use std::sync::Arc;

use daybreak_core::intake::SprintIntake;
use daybreak_core::plan::MasterPlan;
use tracing::info;

use crate::client::{CompletionRequest, TextGenerator};
use crate::config::GeneratorConfig;
use crate::error::LlmError;
use crate::{prompts, recovery};

/// Turns an intake into a structurally valid [`MasterPlan`].
#[derive(Clone)]
pub struct PlanGenerator {
    generator: Arc<dyn TextGenerator>,
    config: GeneratorConfig,
}

impl PlanGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, config: GeneratorConfig) -> Self {
        Self { generator, config }
    }

    /// One generator call, then structural validation. A malformed or
    /// wrong-length plan is rejected outright; the caller decides whether
    /// to re-submit.
    pub async fn generate(&self, intake: &SprintIntake) -> Result<MasterPlan, LlmError> {
        let raw = self
            .generator
            .complete(CompletionRequest {
                system: prompts::master_plan_system(intake),
                user: prompts::master_plan_user(intake),
                max_tokens: self.config.plan_max_tokens,
                temperature: self.config.temperature,
            })
            .await?;

        let plan: MasterPlan = recovery::recover(&raw).map_err(|err| LlmError::MalformedPlan {
            reason: err.to_string(),
        })?;

        plan.validate_contiguity()
            .map_err(|err| LlmError::MalformedPlan {
                reason: err.to_string(),
            })?;

        // The requested length is a contract, not a suggestion. A plan of
        // the wrong length would desynchronize every downstream day count.
        if plan.total_days() != intake.duration_days {
            return Err(LlmError::MalformedPlan {
                reason: format!(
                    "plan has {} days, intake requires {}",
                    plan.total_days(),
                    intake.duration_days
                ),
            });
        }

        info!(days = plan.total_days(), title = %intake.title, "master plan generated");
        Ok(plan)
    }
}
