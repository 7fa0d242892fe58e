//! Test support: a scripted [`TextGenerator`] and canned well-formed
//! replies. Compiled into the library so dependent crates' tests can
//! drive the pipeline without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::client::{CompletionRequest, TextGenerator};
use crate::config::GeneratorConfig;
use crate::error::LlmError;

/// One scripted generator response.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(String),
    /// Fail with this upstream status.
    Refuse(u16),
}

/// Replays a fixed script, one entry per `complete` call. Running past
/// the end fails loudly so tests notice extra calls.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Scripted>>,
}

impl ScriptedGenerator {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    /// Entries not yet consumed; lets a test assert exact call counts.
    pub fn remaining(&self) -> usize {
        self.script.lock().expect("script lock").len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        let next = self.script.lock().expect("script lock").pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Refuse(status)) => Err(LlmError::Upstream {
                status,
                body: "scripted refusal".to_string(),
            }),
            None => Err(LlmError::Upstream {
                status: 500,
                body: "script exhausted".to_string(),
            }),
        }
    }
}

pub fn scripted(script: impl IntoIterator<Item = Scripted>) -> Arc<ScriptedGenerator> {
    Arc::new(ScriptedGenerator::new(script))
}

/// Zero-delay config so tests never sleep.
pub fn fast_config() -> GeneratorConfig {
    GeneratorConfig {
        call_delay: Duration::ZERO,
        ..GeneratorConfig::default()
    }
}

pub fn plan_json(days: u32) -> serde_json::Value {
    json!({
        "overview": {
            "phases": [
                {"name": "Foundation", "startDay": 1, "endDay": days, "focus": "core habits"}
            ],
            "progressionArc": "small steps, compounding daily"
        },
        "days": (1..=days).map(|day| json!({
            "day": day,
            "theme": format!("Theme {day}"),
            "objective": format!("Objective {day}"),
            "keyTakeaways": [format!("Takeaway {day}")],
            "buildingBlocks": "",
            "connections": {"previous": "", "next": ""}
        })).collect::<Vec<_>>()
    })
}

pub fn plan_reply(days: u32) -> String {
    plan_json(days).to_string()
}

pub fn lesson_reply(day: u32) -> String {
    lesson_reply_titled(day, &format!("Lesson {day}"))
}

pub fn lesson_reply_titled(day: u32, title: &str) -> String {
    json!({
        "day": day,
        "title": title,
        "content": format!("Today we work on objective {day}."),
        "exercise": format!("Exercise for day {day}."),
        "affirmation": "I show up for myself."
    })
    .to_string()
}

pub fn email_reply(day: u32) -> String {
    json!({
        "subject": format!("Day {day} is ready"),
        "content": format!("Your day {day} lesson is waiting for you.")
    })
    .to_string()
}

/// Scripted lesson+email pair for every day given, in order.
pub fn day_replies(days: impl IntoIterator<Item = u32>) -> Vec<Scripted> {
    days.into_iter()
        .flat_map(|day| {
            [
                Scripted::Reply(lesson_reply(day)),
                Scripted::Reply(email_reply(day)),
            ]
        })
        .collect()
}
