//! Route definitions for the `/sprints` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::sprints;
use crate::state::AppState;

/// Routes mounted at `/sprints`.
///
/// ```text
/// POST   /master-plan       -> generate_master_plan
/// POST   /generate          -> generate_sprint
/// POST   /regenerate-day    -> regenerate_day
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/master-plan", post(sprints::generate_master_plan))
        .route("/generate", post(sprints::generate_sprint))
        .route("/regenerate-day", post(sprints::regenerate_day))
}
