pub mod channels;
pub mod health;
pub mod runs;
pub mod sprints;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sprints/master-plan       generate a master plan (POST)
/// /sprints/generate          start a generation run (POST)
/// /sprints/regenerate-day    regenerate a single day (POST)
///
/// /runs/advance              run one bounded batch (POST)
/// /runs/{id}                 progress row (GET)
/// /runs/{id}/days            persisted day artifacts (GET)
/// /runs/{id}/cancel          request cancellation (POST)
///
/// /channels/{channel}/ws     live progress WebSocket
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Master plan and content phase triggers, plus regeneration.
        .nest("/sprints", sprints::router())
        // Run lifecycle: batch advance, inspection, cancellation.
        .nest("/runs", runs::router())
        // Realtime event streams.
        .nest("/channels", channels::router())
}
