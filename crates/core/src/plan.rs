//! Master plan: the approved day-by-day curriculum a run generates from.
//!
//! Day numbers are dense and 1-indexed: a plan with N days holds exactly
//! days 1..=N in order. Editing operations go through [`MasterPlan`]
//! methods so the numbering invariant survives user reordering.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One named phase of the sprint arc, covering an inclusive day range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseOutline {
    pub name: String,
    pub start_day: u32,
    pub end_day: u32,
    #[serde(default)]
    pub focus: String,
}

/// Narrative links between a day and its neighbors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayConnections {
    /// How this day picks up from the previous one. Empty on day 1.
    #[serde(default)]
    pub previous: String,
    /// What this day sets up for the next one. Empty on the final day.
    #[serde(default)]
    pub next: String,
}

/// Structural outline of a single day, produced before content exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub day: u32,
    pub theme: String,
    pub objective: String,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    /// How the day builds on what came before.
    #[serde(default)]
    pub building_blocks: String,
    #[serde(default)]
    pub connections: DayConnections,
}

/// Sprint-level summary attached to a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintOverview {
    #[serde(default)]
    pub phases: Vec<PhaseOutline>,
    /// Prose description of how the sprint progresses start to finish.
    #[serde(default)]
    pub progression_arc: String,
}

/// The full approved curriculum: overview plus one [`DayPlan`] per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterPlan {
    #[serde(default)]
    pub overview: SprintOverview,
    pub days: Vec<DayPlan>,
}

impl MasterPlan {
    pub fn total_days(&self) -> u32 {
        self.days.len() as u32
    }

    /// Look up a day's plan by its 1-indexed number.
    pub fn day(&self, day: u32) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.day == day)
    }

    /// Verify day numbers are exactly `1..=len` in order.
    pub fn validate_contiguity(&self) -> Result<(), CoreError> {
        for (idx, day) in self.days.iter().enumerate() {
            let expected = idx as u32 + 1;
            if day.day != expected {
                return Err(CoreError::Validation(format!(
                    "day numbers must be contiguous: position {} holds day {}, expected {}",
                    idx, day.day, expected
                )));
            }
        }
        Ok(())
    }

    /// Rewrite day numbers to `1..=len`, preserving order.
    pub fn renumber(&mut self) {
        for (idx, day) in self.days.iter_mut().enumerate() {
            day.day = idx as u32 + 1;
        }
    }

    /// Move the entry at `from` to position `to`, then renumber so the
    /// contiguity invariant holds after the edit.
    pub fn reorder_day(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        if from >= self.days.len() || to >= self.days.len() {
            return Err(CoreError::Validation(format!(
                "reorder out of range: {} -> {} with {} days",
                from,
                to,
                self.days.len()
            )));
        }
        let entry = self.days.remove(from);
        self.days.insert(to, entry);
        self.renumber();
        Ok(())
    }
}
