//! Client-side aggregate assembled from broadcast events.

use serde::{Deserialize, Serialize};

use crate::lesson::{DailyEmail, DailyLesson};

/// Read model of a sprint as accumulated by an attached session.
///
/// Built incrementally from `lesson-generated` events and/or a bulk load
/// of persisted days. Not authoritative: the progress store and its
/// stored artifacts are. Upsert-by-day keeps the collections free of
/// duplicates no matter how often an event is redelivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSprintDocument {
    pub sprint_id: String,
    pub title: String,
    pub total_days: u32,
    pub lessons: Vec<DailyLesson>,
    pub emails: Vec<DailyEmail>,
}

impl GeneratedSprintDocument {
    pub fn new(sprint_id: impl Into<String>, title: impl Into<String>, total_days: u32) -> Self {
        Self {
            sprint_id: sprint_id.into(),
            title: title.into(),
            total_days,
            lessons: Vec::new(),
            emails: Vec::new(),
        }
    }

    /// Insert or replace the artifacts for one day, keeping day order.
    ///
    /// A later message for an already-present day replaces it, which is
    /// what makes regeneration and broadcast redelivery transparent to
    /// the session.
    pub fn upsert_day(&mut self, lesson: DailyLesson, email: DailyEmail) {
        upsert(&mut self.lessons, lesson, |l| l.day);
        upsert(&mut self.emails, email, |e| e.day);
    }

    pub fn lesson(&self, day: u32) -> Option<&DailyLesson> {
        self.lessons.iter().find(|l| l.day == day)
    }

    pub fn email(&self, day: u32) -> Option<&DailyEmail> {
        self.emails.iter().find(|e| e.day == day)
    }

    /// Days accumulated so far; drives the session's progress indicator.
    pub fn generated_count(&self) -> u32 {
        self.lessons.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.total_days > 0 && self.generated_count() == self.total_days
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, day_of: impl Fn(&T) -> u32) {
    match items.iter().position(|existing| day_of(existing) == day_of(&item)) {
        Some(idx) => items[idx] = item,
        None => {
            items.push(item);
            items.sort_by_key(|entry| day_of(entry));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(day: u32, title: &str) -> DailyLesson {
        DailyLesson {
            day,
            title: title.to_string(),
            content: format!("content for day {day}"),
            exercise: String::new(),
            affirmation: String::new(),
        }
    }

    fn email(day: u32) -> DailyEmail {
        DailyEmail {
            day,
            subject: format!("Day {day}"),
            content: format!("email for day {day}"),
        }
    }

    // -- upsert ------------------------------------------------------------

    #[test]
    fn days_stay_sorted_regardless_of_arrival_order() {
        let mut doc = GeneratedSprintDocument::new("s1", "Test", 3);
        doc.upsert_day(lesson(3, "c"), email(3));
        doc.upsert_day(lesson(1, "a"), email(1));
        doc.upsert_day(lesson(2, "b"), email(2));

        let days: Vec<u32> = doc.lessons.iter().map(|l| l.day).collect();
        assert_eq!(days, vec![1, 2, 3]);
        assert!(doc.is_complete());
    }

    #[test]
    fn duplicate_event_leaves_one_entry() {
        let mut doc = GeneratedSprintDocument::new("s1", "Test", 7);
        doc.upsert_day(lesson(2, "first"), email(2));
        doc.upsert_day(lesson(2, "first"), email(2));

        assert_eq!(doc.lessons.len(), 1);
        assert_eq!(doc.emails.len(), 1);
        assert_eq!(doc.generated_count(), 1);
    }

    #[test]
    fn later_event_for_same_day_replaces() {
        let mut doc = GeneratedSprintDocument::new("s1", "Test", 7);
        doc.upsert_day(lesson(4, "original"), email(4));
        doc.upsert_day(lesson(4, "regenerated"), email(4));

        assert_eq!(doc.lessons.len(), 1);
        assert_eq!(doc.lesson(4).unwrap().title, "regenerated");
    }

    // -- completion --------------------------------------------------------

    #[test]
    fn empty_document_is_not_complete() {
        let doc = GeneratedSprintDocument::new("s1", "Test", 0);
        assert!(!doc.is_complete());
    }
}
