//! Route definitions for the `/channels` resource.

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Routes mounted at `/channels`.
///
/// ```text
/// GET    /{channel}/ws    -> ws_handler (upgrade)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{channel}/ws", get(ws::ws_handler))
}
