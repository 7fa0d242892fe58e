//! Route definitions for the `/runs` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::runs;
use crate::state::AppState;

/// Routes mounted at `/runs`.
///
/// ```text
/// POST   /advance        -> advance_run
/// GET    /{id}           -> get_run
/// GET    /{id}/days      -> list_run_days
/// POST   /{id}/cancel    -> cancel_run
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/advance", post(runs::advance_run))
        .route("/{id}", get(runs::get_run))
        .route("/{id}/days", get(runs::list_run_days))
        .route("/{id}/cancel", post(runs::cancel_run))
}
