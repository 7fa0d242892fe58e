//! Shared domain types for the daybreak generation pipeline.
//!
//! Everything here is plain data: sprint intake, curriculum plans,
//! generated artifacts, and the batch-window arithmetic the orchestrator
//! runs on. Persistence and transport live in the other crates.

pub mod batch;
pub mod document;
pub mod error;
pub mod intake;
pub mod lesson;
pub mod plan;
pub mod types;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
