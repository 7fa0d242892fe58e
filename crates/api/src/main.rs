//! Daybreak API server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daybreak_api::config::{self, ServerConfig};
use daybreak_api::router::build_app_router;
use daybreak_api::state::AppState;
use daybreak_db::{PgProgressStore, ProgressStore};
use daybreak_events::ChannelRegistry;
use daybreak_llm::{ContentGenerator, OpenAiGenerator, PlanGenerator};
use daybreak_pipeline::BatchOrchestrator;

#[tokio::main]
async fn main() {
    // --- Environment & logging ---
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybreak_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = daybreak_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    daybreak_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    daybreak_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Generation stack ---
    let generator_config = config::generator_config_from_env();
    let generator = Arc::new(
        OpenAiGenerator::new(generator_config.clone()).expect("Failed to build generator client"),
    );
    let plans = PlanGenerator::new(generator.clone(), generator_config.clone());
    let content = ContentGenerator::new(generator, generator_config);

    let store: Arc<dyn ProgressStore> = Arc::new(PgProgressStore::new(pool.clone()));
    let registry = ChannelRegistry::new();
    let orchestrator = BatchOrchestrator::new(
        store.clone(),
        registry.clone(),
        plans,
        content.clone(),
        config::orchestrator_config_from_env(),
    );

    // --- Shutdown plumbing ---
    // One token shared by the WebSocket streams and the generation
    // drivers; a run interrupted mid-batch checkpoints, releases back to
    // pending, and resumes on the next start.
    let shutdown = CancellationToken::new();
    let tasks = TaskTracker::new();

    // --- Application state & router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        registry,
        orchestrator,
        content,
        tasks: tasks.clone(),
        shutdown: shutdown.clone(),
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be a valid IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!("Server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("Server error");

    // --- Drain background drivers ---
    tasks.close();
    if tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        tasks.wait(),
    )
    .await
    .is_err()
    {
        tracing::warn!("Background drivers did not drain before the shutdown timeout");
    }

    tracing::info!("Server stopped");
}

/// Wait for SIGINT or SIGTERM, then cancel the shared token so background
/// work stops at its next suspension point.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
