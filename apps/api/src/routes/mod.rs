pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::generation::handlers as generation_handlers;
use crate::plans::handlers as plan_handlers;
use crate::settings::handlers as settings_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Admin settings
        .route(
            "/api/v1/settings/ai",
            get(settings_handlers::handle_get_ai_settings),
        )
        .route(
            "/api/v1/settings/ai",
            put(settings_handlers::handle_put_ai_settings),
        )
        .route(
            "/api/v1/settings/generation",
            get(settings_handlers::handle_get_generation_settings),
        )
        .route(
            "/api/v1/settings/generation",
            put(settings_handlers::handle_put_generation_settings),
        )
        // Plans
        .route("/api/v1/plans", post(plan_handlers::handle_create_plan))
        .route("/api/v1/plans/:id", get(plan_handlers::handle_get_plan))
        .route(
            "/api/v1/plans/:id",
            delete(plan_handlers::handle_delete_plan),
        )
        .route(
            "/api/v1/plans/:id/lessons/:week/:lesson/generate",
            post(generation_handlers::handle_generate_plan_slot),
        )
        // Standalone single-lesson generation
        .route(
            "/api/v1/lessons/generate",
            post(generation_handlers::handle_generate_lesson),
        )
        .with_state(state)
}
