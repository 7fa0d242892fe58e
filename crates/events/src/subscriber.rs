//! Session-scoped subscriber that folds a channel's events into a
//! [`GeneratedSprintDocument`].

use daybreak_core::document::GeneratedSprintDocument;
use daybreak_core::lesson::DayArtifacts;
use tokio::sync::broadcast;
use tracing::warn;

use crate::bus::ChannelRegistry;
use crate::event::SprintEvent;

/// Where the attached session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriberPhase {
    Streaming,
    Finished,
    /// Generation halted. Accumulated days stay available.
    Failed { day: u32, error: String },
}

/// One session's view of a running generation.
///
/// Resume is two-phase: [`attach`](Self::attach) subscribes to the live
/// channel before the caller bulk-fetches persisted days for
/// [`load_persisted`](Self::load_persisted). Any day arriving through
/// both paths is absorbed by upsert-by-day, so the ordering closes the
/// gap where a day lands between fetch and subscribe.
pub struct SprintSubscriber {
    channel: String,
    document: GeneratedSprintDocument,
    phase: SubscriberPhase,
    receiver: broadcast::Receiver<SprintEvent>,
}

impl SprintSubscriber {
    /// Subscribe to `channel`. Must happen before fetching persisted days.
    pub async fn attach(
        registry: &ChannelRegistry,
        channel: &str,
        document: GeneratedSprintDocument,
    ) -> Self {
        let receiver = registry.subscribe(channel).await;
        Self {
            channel: channel.to_string(),
            document,
            phase: SubscriberPhase::Streaming,
            receiver,
        }
    }

    /// Fold already-persisted days into the document (resume phase two).
    pub fn load_persisted(&mut self, days: Vec<DayArtifacts>) {
        for artifacts in days {
            self.document.upsert_day(artifacts.lesson, artifacts.email);
        }
        if self.document.is_complete() {
            self.phase = SubscriberPhase::Finished;
        }
    }

    /// Fold one event into the document and phase.
    pub fn apply(&mut self, event: &SprintEvent) {
        match event {
            SprintEvent::LessonGenerated { lesson, email } => {
                self.document.upsert_day(lesson.clone(), email.clone());
            }
            SprintEvent::GenerationComplete { .. } => {
                self.phase = SubscriberPhase::Finished;
            }
            SprintEvent::GenerationError { day, error } => {
                self.phase = SubscriberPhase::Failed {
                    day: *day,
                    error: error.clone(),
                };
            }
            SprintEvent::StructureGenerationStarted
            | SprintEvent::StructureGenerated { .. } => {}
        }
    }

    /// Next event from the channel, already applied. `None` once the
    /// channel closes. A lagged receiver skips what it missed and keeps
    /// going; upsert-by-day plus the persisted fetch make the loss
    /// recoverable.
    pub async fn next_event(&mut self) -> Option<SprintEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    self.apply(&event);
                    return Some(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(channel = %self.channel, skipped, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn document(&self) -> &GeneratedSprintDocument {
        &self.document
    }

    pub fn phase(&self) -> &SubscriberPhase {
        &self.phase
    }

    /// Tear down the subscription, keeping what was accumulated.
    pub fn detach(self) -> GeneratedSprintDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybreak_core::lesson::{DailyEmail, DailyLesson};

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
                subject: format!("Day {day}"),
                content: "email".into(),
            },
        }
    }

    fn lesson_event(day: u32, tag: &str) -> SprintEvent {
        let DayArtifacts { lesson, email, .. } = artifacts(day, tag);
        SprintEvent::LessonGenerated { lesson, email }
    }

    // --- Test: two-phase resume absorbs the fetch/stream overlap ---

    #[tokio::test]
    async fn persisted_load_and_live_stream_overlap_cleanly() {
        let registry = ChannelRegistry::new();
        let document = GeneratedSprintDocument::new("sprint-1", "Momentum", 7);
        let mut subscriber =
            SprintSubscriber::attach(&registry, "sprint-1-progress", document).await;

        // Day 2 lands on the channel while the bulk fetch is in flight.
        registry
            .publish("sprint-1-progress", lesson_event(2, "live"))
            .await;
        subscriber.load_persisted(vec![artifacts(1, "stored"), artifacts(2, "stored")]);

        subscriber.next_event().await.unwrap();
        registry
            .publish("sprint-1-progress", lesson_event(3, "live"))
            .await;
        subscriber.next_event().await.unwrap();

        let doc = subscriber.document();
        assert_eq!(doc.generated_count(), 3);
        assert_eq!(doc.lesson(2).unwrap().title, "Lesson 2 live");
        assert_eq!(doc.lesson(3).unwrap().title, "Lesson 3 live");
    }

    // --- Test: a failure keeps accumulated days ---

    #[tokio::test]
    async fn error_surfaces_without_discarding_days() {
        let registry = ChannelRegistry::new();
        let document = GeneratedSprintDocument::new("sprint-1", "Momentum", 7);
        let mut subscriber =
            SprintSubscriber::attach(&registry, "sprint-1-progress", document).await;

        registry
            .publish("sprint-1-progress", lesson_event(1, "ok"))
            .await;
        registry
            .publish(
                "sprint-1-progress",
                SprintEvent::GenerationError {
                    day: 2,
                    error: "Upstream generator returned status 429".into(),
                },
            )
            .await;

        subscriber.next_event().await.unwrap();
        subscriber.next_event().await.unwrap();

        assert_eq!(
            subscriber.phase(),
            &SubscriberPhase::Failed {
                day: 2,
                error: "Upstream generator returned status 429".into()
            }
        );
        assert_eq!(subscriber.document().generated_count(), 1);
    }

    // --- Test: completion flips the phase ---

    #[tokio::test]
    async fn completion_event_finishes_the_session() {
        let registry = ChannelRegistry::new();
        let document = GeneratedSprintDocument::new("sprint-1", "Momentum", 1);
        let mut subscriber =
            SprintSubscriber::attach(&registry, "sprint-1-progress", document).await;

        registry
            .publish("sprint-1-progress", lesson_event(1, "only"))
            .await;
        registry
            .publish(
                "sprint-1-progress",
                SprintEvent::GenerationComplete {
                    sprint_id: "sprint-1".into(),
                },
            )
            .await;

        subscriber.next_event().await.unwrap();
        subscriber.next_event().await.unwrap();
        assert_eq!(subscriber.phase(), &SubscriberPhase::Finished);

        let doc = subscriber.detach();
        assert!(doc.is_complete());
    }

    // --- Test: loading a fully persisted run finishes immediately ---

    #[tokio::test]
    async fn fully_persisted_run_is_finished_on_load() {
        let registry = ChannelRegistry::new();
        let document = GeneratedSprintDocument::new("sprint-1", "Momentum", 2);
        let mut subscriber =
            SprintSubscriber::attach(&registry, "sprint-1-progress", document).await;

        subscriber.load_persisted(vec![artifacts(1, "stored"), artifacts(2, "stored")]);
        assert_eq!(subscriber.phase(), &SubscriberPhase::Finished);
    }

    // --- Test: a lagged receiver recovers and keeps consuming ---

    #[tokio::test]
    async fn lagged_receiver_skips_and_continues() {
        let registry = ChannelRegistry::with_capacity(1);
        let document = GeneratedSprintDocument::new("sprint-1", "Momentum", 7);
        let mut subscriber =
            SprintSubscriber::attach(&registry, "sprint-1-progress", document).await;

        for day in 1..=3 {
            registry
                .publish("sprint-1-progress", lesson_event(day, "burst"))
                .await;
        }

        // Only the newest event fits the buffer; the rest were lagged out.
        let event = subscriber.next_event().await.unwrap();
        assert_eq!(event.kind(), "lesson-generated");
        assert_eq!(subscriber.document().lesson(3).unwrap().day, 3);
    }
}
