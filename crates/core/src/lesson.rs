//! Generated per-day artifacts.

use serde::{Deserialize, Serialize};

/// A generated day: one continuous narration script plus the pieces
/// extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLesson {
    /// Day number. Generator replies sometimes omit or misnumber it, so
    /// the pipeline overwrites it from the plan after parsing.
    #[serde(default)]
    pub day: u32,
    pub title: String,
    /// Full script: lesson, exercise introduction, and affirmation as one
    /// continuous text.
    pub content: String,
    #[serde(default)]
    pub exercise: String,
    #[serde(default)]
    pub affirmation: String,
}

/// Email paired 1:1 with the same day's lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEmail {
    pub day: u32,
    pub subject: String,
    pub content: String,
}

/// Both artifacts for one generated day, as persisted and broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayArtifacts {
    pub day: u32,
    pub lesson: DailyLesson,
    pub email: DailyEmail,
}
