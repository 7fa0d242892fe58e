//! Sprint intake: the creator-supplied form a run is created from.
//!
//! The intake is collected by an external wizard and arrives as camelCase
//! JSON. Once generation begins it is frozen into the progress row, so
//! nothing here is mutated by the pipeline.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Sprint lengths (in days) that may be requested.
pub const ALLOWED_DURATIONS: [u32; 5] = [7, 14, 21, 30, 40];

/// Everything the creator tells us about the sprint they want.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SprintIntake {
    #[validate(length(min = 1, max = 200))]
    pub creator_name: String,

    #[validate(email)]
    pub creator_email: String,

    #[serde(default)]
    pub creator_bio: String,

    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Sprint length in days. Must be one of [`ALLOWED_DURATIONS`];
    /// checked by [`SprintIntake::ensure_valid`].
    pub duration_days: u32,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub target_audience: String,

    /// Voice/tone guidance passed through to the generator prompts.
    #[serde(default)]
    pub tone: String,

    #[serde(default)]
    pub content_types: Vec<String>,

    #[serde(default)]
    pub voice_preference: String,

    #[serde(default)]
    pub goals: String,

    #[serde(default)]
    pub special_requirements: String,

    #[serde(default)]
    pub participant_emails: Vec<String>,
}

impl SprintIntake {
    /// Field validation plus the duration whitelist.
    pub fn ensure_valid(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|err| CoreError::Validation(err.to_string()))?;

        if !ALLOWED_DURATIONS.contains(&self.duration_days) {
            return Err(CoreError::Validation(format!(
                "durationDays must be one of {:?}, got {}",
                ALLOWED_DURATIONS, self.duration_days
            )));
        }

        Ok(())
    }
}
