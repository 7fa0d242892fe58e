use std::sync::Arc;

use daybreak_db::{DbPool, ProgressStore};
use daybreak_events::ChannelRegistry;
use daybreak_llm::ContentGenerator;
use daybreak_pipeline::BatchOrchestrator;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. Used by the health check; the progress
    /// store holds its own handle.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Durable record of generation runs.
    pub store: Arc<dyn ProgressStore>,
    /// Per-sprint broadcast channels for realtime progress events.
    pub registry: ChannelRegistry,
    /// Drives generation runs through bounded batches.
    pub orchestrator: BatchOrchestrator,
    /// Per-day generator used by the out-of-band regeneration path.
    pub content: ContentGenerator,
    /// Background generation drivers spawned by `/sprints/generate`.
    /// Shutdown closes the tracker and waits for them to checkpoint.
    pub tasks: TaskTracker,
    /// Fires on SIGINT/SIGTERM. In-flight batches observe it at the next
    /// day boundary and release their run back to pending.
    pub shutdown: CancellationToken,
}
