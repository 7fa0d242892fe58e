//! Per-day content generation: one lesson, one email.

use std::sync::Arc;

use daybreak_core::intake::SprintIntake;
use daybreak_core::lesson::{DailyEmail, DailyLesson, DayArtifacts};
use daybreak_core::plan::DayPlan;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::{CompletionRequest, TextGenerator};
use crate::config::GeneratorConfig;
use crate::error::LlmError;
use crate::{prompts, recovery};

/// Email wire shape as the generator returns it; the day number is ours.
#[derive(Debug, Deserialize)]
struct EmailDraft {
    subject: String,
    content: String,
}

/// Generates both artifacts for a single day.
#[derive(Clone)]
pub struct ContentGenerator {
    generator: Arc<dyn TextGenerator>,
    config: GeneratorConfig,
}

impl ContentGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, config: GeneratorConfig) -> Self {
        Self { generator, config }
    }

    /// Lesson call, throttle, email call. Fails on the first unusable
    /// reply; a half-generated day is never returned.
    pub async fn generate_day(
        &self,
        intake: &SprintIntake,
        day_plan: &DayPlan,
        total_days: u32,
        cancel: &CancellationToken,
    ) -> Result<DayArtifacts, LlmError> {
        let day = day_plan.day;
        debug!(day, "generating lesson");
        let raw = self
            .generator
            .complete(CompletionRequest {
                system: prompts::lesson_system(intake),
                user: prompts::lesson_user(intake, day_plan, total_days),
                max_tokens: self.config.lesson_max_tokens,
                temperature: self.config.temperature,
            })
            .await?;
        let mut lesson: DailyLesson = recovery::recover(&raw)?;
        // The plan is authoritative for numbering, whatever the reply said.
        lesson.day = day;

        self.throttle(cancel).await;

        debug!(day, "generating email");
        let raw = self
            .generator
            .complete(CompletionRequest {
                system: prompts::email_system(intake),
                user: prompts::email_user(day_plan, &lesson),
                max_tokens: self.config.email_max_tokens,
                temperature: self.config.temperature,
            })
            .await?;
        let draft: EmailDraft = recovery::recover(&raw)?;
        let email = DailyEmail {
            day,
            subject: draft.subject,
            content: draft.content,
        };

        Ok(DayArtifacts { day, lesson, email })
    }

    /// Rate-limit spacing between the two calls. Cancellation only cuts
    /// the wait short; the decision to stop belongs to the caller's day
    /// boundary.
    async fn throttle(&self, cancel: &CancellationToken) {
        let delay = self.config.call_delay;
        if delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        email_reply, fast_config, lesson_reply, lesson_reply_titled, scripted, Scripted,
    };
    use assert_matches::assert_matches;
    use daybreak_core::plan::DayConnections;
    use std::time::Duration;

    fn intake() -> SprintIntake {
        SprintIntake {
            creator_name: "Asha".to_string(),
            creator_email: "asha@example.com".to_string(),
            creator_bio: String::new(),
            title: "Morning Momentum".to_string(),
            description: String::new(),
            duration_days: 7,
            category: String::new(),
            target_audience: String::new(),
            tone: String::new(),
            content_types: vec![],
            voice_preference: String::new(),
            goals: String::new(),
            special_requirements: String::new(),
            participant_emails: vec![],
        }
    }

    fn day_plan(day: u32) -> DayPlan {
        DayPlan {
            day,
            theme: format!("Theme {day}"),
            objective: format!("Objective {day}"),
            key_takeaways: vec![],
            building_blocks: String::new(),
            connections: DayConnections::default(),
        }
    }

    #[tokio::test]
    async fn generates_lesson_then_email() {
        let content = ContentGenerator::new(
            scripted([
                Scripted::Reply(lesson_reply(3)),
                Scripted::Reply(email_reply(3)),
            ]),
            fast_config(),
        );
        let token = CancellationToken::new();
        let artifacts = content
            .generate_day(&intake(), &day_plan(3), 7, &token)
            .await
            .unwrap();
        assert_eq!(artifacts.day, 3);
        assert_eq!(artifacts.lesson.day, 3);
        assert_eq!(artifacts.email.day, 3);
    }

    #[tokio::test]
    async fn misnumbered_lesson_is_corrected_from_the_plan() {
        let content = ContentGenerator::new(
            scripted([
                Scripted::Reply(lesson_reply_titled(9, "Wrong Number")),
                Scripted::Reply(email_reply(2)),
            ]),
            fast_config(),
        );
        let token = CancellationToken::new();
        let artifacts = content
            .generate_day(&intake(), &day_plan(2), 7, &token)
            .await
            .unwrap();
        assert_eq!(artifacts.lesson.day, 2);
        assert_eq!(artifacts.lesson.title, "Wrong Number");
    }

    #[tokio::test]
    async fn malformed_email_fails_the_whole_day() {
        let content = ContentGenerator::new(
            scripted([
                Scripted::Reply(lesson_reply(1)),
                Scripted::Reply("I would rather write free prose.".to_string()),
            ]),
            fast_config(),
        );
        let token = CancellationToken::new();
        assert_matches!(
            content.generate_day(&intake(), &day_plan(1), 7, &token).await,
            Err(LlmError::MalformedContent(_))
        );
    }

    #[tokio::test]
    async fn upstream_refusal_surfaces() {
        let content = ContentGenerator::new(scripted([Scripted::Refuse(429)]), fast_config());
        let token = CancellationToken::new();
        assert_matches!(
            content.generate_day(&intake(), &day_plan(1), 7, &token).await,
            Err(LlmError::Upstream { status: 429, .. })
        );
    }

    #[tokio::test]
    async fn cancelled_token_skips_the_throttle() {
        let mut config = fast_config();
        config.call_delay = Duration::from_secs(60);
        let content = ContentGenerator::new(
            scripted([
                Scripted::Reply(lesson_reply(1)),
                Scripted::Reply(email_reply(1)),
            ]),
            config,
        );
        let token = CancellationToken::new();
        token.cancel();

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            content.generate_day(&intake(), &day_plan(1), 7, &token),
        )
        .await
        .expect("throttle should not block a cancelled run");
        assert!(result.is_ok());
    }
}
