//! Batch window arithmetic for the orchestrator.

use serde::{Deserialize, Serialize};

/// Default days generated per batch invocation. Small enough to keep one
/// invocation well under any execution ceiling, large enough that a
/// 7-day sprint finishes in two.
pub const DEFAULT_BATCH_SIZE: u32 = 4;

/// Inclusive day range processed by a single orchestrator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWindow {
    pub start: u32,
    pub end: u32,
}

impl BatchWindow {
    /// Window for a run positioned at `current_day`, clipped to
    /// `total_days`. `None` when the pointer is already past the end.
    pub fn compute(current_day: u32, batch_size: u32, total_days: u32) -> Option<Self> {
        if current_day == 0 || current_day > total_days {
            return None;
        }
        let size = batch_size.max(1);
        let end = current_day.saturating_add(size - 1).min(total_days);
        Some(Self { start: current_day, end })
    }

    pub fn day_count(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn days(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Range label used in responses, e.g. `"1-4"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}
