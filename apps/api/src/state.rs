use sqlx::PgPool;

use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// There is no long-lived LLM client here: the active provider, model and API
/// key come from the `ai_settings` row at request time, so the state only
/// carries the shared HTTP client the provider adapters send through.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub http: reqwest::Client,
    pub config: Config,
}
