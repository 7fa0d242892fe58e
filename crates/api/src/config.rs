use std::time::Duration;

use daybreak_llm::GeneratorConfig;
use daybreak_pipeline::OrchestratorConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background generation drivers to
    /// checkpoint and release their runs (default: `30`).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
        }
    }
}

/// Load generator settings from environment variables.
///
/// The request timeout must comfortably exceed one upstream completion;
/// it is independent of the HTTP server's own `REQUEST_TIMEOUT_SECS`.
///
/// | Env Var                    | Default                     |
/// |----------------------------|-----------------------------|
/// | `OPENAI_API_KEY`           | (required)                  |
/// | `OPENAI_BASE_URL`          | `https://api.openai.com/v1` |
/// | `OPENAI_MODEL`             | `gpt-4o-mini`               |
/// | `GENERATOR_TIMEOUT_SECS`   | `120`                       |
/// | `PLAN_MAX_TOKENS`          | `8192`                      |
/// | `LESSON_MAX_TOKENS`        | `4096`                      |
/// | `EMAIL_MAX_TOKENS`         | `1024`                      |
/// | `GENERATION_CALL_DELAY_MS` | `500`                       |
/// | `GENERATION_TEMPERATURE`   | `0.7`                       |
pub fn generator_config_from_env() -> GeneratorConfig {
    let defaults = GeneratorConfig::default();

    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");

    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url);

    let model = std::env::var("OPENAI_MODEL").unwrap_or(defaults.model);

    let request_timeout_secs: u64 = std::env::var("GENERATOR_TIMEOUT_SECS")
        .unwrap_or_else(|_| "120".into())
        .parse()
        .expect("GENERATOR_TIMEOUT_SECS must be a valid u64");

    let plan_max_tokens: u32 = std::env::var("PLAN_MAX_TOKENS")
        .unwrap_or_else(|_| defaults.plan_max_tokens.to_string())
        .parse()
        .expect("PLAN_MAX_TOKENS must be a valid u32");

    let lesson_max_tokens: u32 = std::env::var("LESSON_MAX_TOKENS")
        .unwrap_or_else(|_| defaults.lesson_max_tokens.to_string())
        .parse()
        .expect("LESSON_MAX_TOKENS must be a valid u32");

    let email_max_tokens: u32 = std::env::var("EMAIL_MAX_TOKENS")
        .unwrap_or_else(|_| defaults.email_max_tokens.to_string())
        .parse()
        .expect("EMAIL_MAX_TOKENS must be a valid u32");

    let call_delay_ms: u64 = std::env::var("GENERATION_CALL_DELAY_MS")
        .unwrap_or_else(|_| "500".into())
        .parse()
        .expect("GENERATION_CALL_DELAY_MS must be a valid u64");

    let temperature: f32 = std::env::var("GENERATION_TEMPERATURE")
        .unwrap_or_else(|_| defaults.temperature.to_string())
        .parse()
        .expect("GENERATION_TEMPERATURE must be a valid f32");

    GeneratorConfig {
        base_url,
        api_key,
        model,
        request_timeout: Duration::from_secs(request_timeout_secs),
        plan_max_tokens,
        lesson_max_tokens,
        email_max_tokens,
        call_delay: Duration::from_millis(call_delay_ms),
        temperature,
    }
}

/// Load orchestrator tuning from environment variables.
///
/// | Env Var                   | Default |
/// |---------------------------|---------|
/// | `GENERATION_BATCH_SIZE`   | `4`     |
/// | `GENERATION_DAY_DELAY_MS` | `1000`  |
pub fn orchestrator_config_from_env() -> OrchestratorConfig {
    let defaults = OrchestratorConfig::default();

    let batch_size: u32 = std::env::var("GENERATION_BATCH_SIZE")
        .unwrap_or_else(|_| defaults.batch_size.to_string())
        .parse()
        .expect("GENERATION_BATCH_SIZE must be a valid u32");

    let day_delay_ms: u64 = std::env::var("GENERATION_DAY_DELAY_MS")
        .unwrap_or_else(|_| "1000".into())
        .parse()
        .expect("GENERATION_DAY_DELAY_MS must be a valid u64");

    OrchestratorConfig {
        batch_size,
        day_delay: Duration::from_millis(day_delay_ms),
    }
}
