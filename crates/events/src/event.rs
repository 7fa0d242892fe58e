//! Wire format of realtime generation events.

use daybreak_core::lesson::{DailyEmail, DailyLesson};
use daybreak_core::plan::MasterPlan;
use serde::{Deserialize, Serialize};

/// Events published on a sprint's broadcast channel.
///
/// Delivery is best-effort and session-scoped; nothing downstream may
/// depend on an event arriving. The durable record lives in the progress
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum SprintEvent {
    /// Master plan generation has begun.
    StructureGenerationStarted,

    /// The approved plan structure, sent once it exists.
    StructureGenerated { structure: MasterPlan },

    /// One day's lesson and email, sent as soon as the day is saved.
    LessonGenerated {
        lesson: DailyLesson,
        email: DailyEmail,
    },

    /// Every day generated and the run marked completed.
    #[serde(rename_all = "camelCase")]
    GenerationComplete { sprint_id: String },

    /// Generation halted at `day`. Days before it remain intact.
    GenerationError { day: u32, error: String },
}

impl SprintEvent {
    /// Wire name of the event, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StructureGenerationStarted => "structure-generation-started",
            Self::StructureGenerated { .. } => "structure-generated",
            Self::LessonGenerated { .. } => "lesson-generated",
            Self::GenerationComplete { .. } => "generation-complete",
            Self::GenerationError { .. } => "generation-error",
        }
    }
}
