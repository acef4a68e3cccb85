//! Axum route handlers for lesson generation.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::{generate_plan_slot, generate_single_lesson, GenerationOutcome};
use crate::models::lesson::LessonExerciseData;
use crate::models::request::GenerationRequest;
use crate::models::Notification;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateLessonResponse {
    pub lesson: Option<LessonExerciseData>,
    pub fallback_used: bool,
    pub notifications: Vec<Notification>,
}

impl From<GenerationOutcome> for GenerateLessonResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            lesson: outcome.lesson,
            fallback_used: outcome.fallback_used,
            notifications: outcome.notifications,
        }
    }
}

/// POST /api/v1/lessons/generate
///
/// Standalone single-lesson generation from a full request body. Always
/// returns 200 with either a lesson, a fallback lesson, or notifications
/// explaining why nothing was generated.
pub async fn handle_generate_lesson(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerateLessonResponse>, AppError> {
    validate_request(&request)?;

    let outcome = generate_single_lesson(&state, request).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/plans/:id/lessons/:week/:lesson/generate
///
/// On-demand generation of one slot of a multi-week plan. Prior-lesson
/// context is re-derived from the store, so a slot generated out of order
/// still sees all earlier lessons.
pub async fn handle_generate_plan_slot(
    State(state): State<AppState>,
    Path((plan_id, week, lesson)): Path<(Uuid, u32, u32)>,
) -> Result<Json<GenerateLessonResponse>, AppError> {
    if week == 0 || lesson == 0 {
        return Err(AppError::Validation(
            "week and lesson numbers start at 1".to_string(),
        ));
    }

    let outcome = generate_plan_slot(&state, plan_id, week, lesson).await?;
    Ok(Json(outcome.into()))
}

fn validate_request(request: &GenerationRequest) -> Result<(), AppError> {
    if request.preparation_time == 0 || request.main_time == 0 || request.finish_time == 0 {
        return Err(AppError::Validation(
            "phase durations must be positive".to_string(),
        ));
    }
    if !(1..=9).contains(&request.grade) {
        return Err(AppError::Validation("grade must be 1-9".to_string()));
    }
    Ok(())
}
