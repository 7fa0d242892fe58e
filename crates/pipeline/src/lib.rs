//! Generation pipeline: the batch orchestrator that drives runs through
//! claim/generate/checkpoint cycles, and the standalone day regenerator.

pub mod error;
pub mod orchestrator;
pub mod regenerate;

pub use error::PipelineError;
pub use orchestrator::{BatchOrchestrator, BatchOutcome, OrchestratorConfig};
pub use regenerate::regenerate_day;
