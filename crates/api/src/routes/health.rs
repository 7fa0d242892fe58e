//! Service health: `GET /` and `GET /health`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Probe payload. Answers 200 even when the pool is down; the body
/// carries the distinction.
#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

/// Root-level routes, mounted outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(report))
        .route("/health", get(report))
}

async fn report(State(state): State<AppState>) -> Json<HealthReport> {
    let db_healthy = daybreak_db::health_check(&state.pool).await.is_ok();

    Json(HealthReport {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}
