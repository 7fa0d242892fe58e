//! Generator tuning knobs.

use std::time::Duration;

/// Settings for the upstream text generator.
///
/// Token budgets are per artifact kind; the throttle delay spaces the two
/// calls a day makes so a long run stays under provider rate limits.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
    pub plan_max_tokens: u32,
    pub lesson_max_tokens: u32,
    pub email_max_tokens: u32,
    /// Pause between a day's lesson call and its email call.
    pub call_delay: Duration,
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            request_timeout: Duration::from_secs(120),
            plan_max_tokens: 8192,
            lesson_max_tokens: 4096,
            email_max_tokens: 1024,
            call_delay: Duration::from_millis(500),
            temperature: 0.7,
        }
    }
}
