//! Upstream generator integration: prompts, the HTTP client, JSON
//! recovery, and the plan/content generators built on top of them.

pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod plan;
pub mod prompts;
pub mod recovery;
pub mod testing;

pub use client::{CompletionRequest, OpenAiGenerator, TextGenerator};
pub use config::GeneratorConfig;
pub use content::ContentGenerator;
pub use error::LlmError;
pub use plan::PlanGenerator;
pub use recovery::JsonRecoveryError;
