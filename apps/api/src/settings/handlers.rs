//! Axum route handlers for the admin settings screens.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::settings::{AiSettingsRow, GenerationSettings};
use crate::settings::{
    load_ai_settings, load_generation_settings, upsert_ai_settings, upsert_generation_settings,
    AiSettingsUpdate,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AiSettingsResponse {
    pub settings: Option<AiSettingsRow>,
}

/// GET /api/v1/settings/ai
pub async fn handle_get_ai_settings(
    State(state): State<AppState>,
) -> Result<Json<AiSettingsResponse>, AppError> {
    let settings = load_ai_settings(&state.db)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(AiSettingsResponse { settings }))
}

/// PUT /api/v1/settings/ai
pub async fn handle_put_ai_settings(
    State(state): State<AppState>,
    Json(update): Json<AiSettingsUpdate>,
) -> Result<Json<AiSettingsRow>, AppError> {
    if crate::models::settings::AiProvider::parse(&update.provider).is_none() {
        return Err(AppError::Validation(format!(
            "unknown provider '{}' (expected 'openai' or 'groq')",
            update.provider
        )));
    }
    if update.enabled && update.api_key.trim().is_empty() {
        return Err(AppError::Validation(
            "api_key must be set when AI is enabled".to_string(),
        ));
    }

    let row = upsert_ai_settings(&state.db, &update)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(row))
}

/// GET /api/v1/settings/generation
pub async fn handle_get_generation_settings(
    State(state): State<AppState>,
) -> Result<Json<GenerationSettings>, AppError> {
    let settings = load_generation_settings(&state.db)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(settings))
}

/// PUT /api/v1/settings/generation
pub async fn handle_put_generation_settings(
    State(state): State<AppState>,
    Json(settings): Json<GenerationSettings>,
) -> Result<Json<GenerationSettings>, AppError> {
    if settings.min_exercises_preparation > settings.max_exercises_preparation
        || settings.min_exercises_main > settings.max_exercises_main
        || settings.min_exercises_finish > settings.max_exercises_finish
    {
        return Err(AppError::Validation(
            "per-phase minimum exercise count exceeds maximum".to_string(),
        ));
    }

    upsert_generation_settings(&state.db, &settings)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(settings))
}
