//! Axum route handlers for plan CRUD.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::{initialize_plan, SlotStatus};
use crate::models::rows::{PlanLessonRow, PlanRow};
use crate::plans::store::{self, CreatePlanInput};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatePlanResponse {
    pub plan: PlanRow,
    pub slots: Vec<SlotStatus>,
}

#[derive(Debug, Serialize)]
pub struct PlanDetailResponse {
    pub plan: PlanRow,
    pub lessons: Vec<PlanLessonRow>,
}

/// POST /api/v1/plans
///
/// Creates a plan and runs whole-plan initialization: only slot (1, 1) is
/// generated automatically, the rest of the grid comes back as placeholders
/// the UI triggers individually.
pub async fn handle_create_plan(
    State(state): State<AppState>,
    Json(input): Json<CreatePlanInput>,
) -> Result<Json<CreatePlanResponse>, AppError> {
    if input.weeks_count < 1 || input.lessons_per_week < 1 {
        return Err(AppError::Validation(
            "weeks_count and lessons_per_week must be at least 1".to_string(),
        ));
    }
    if input.preparation_time < 1 || input.main_time < 1 || input.finish_time < 1 {
        return Err(AppError::Validation(
            "phase durations must be positive".to_string(),
        ));
    }

    let plan = store::create_plan(&state.db, &input)
        .await
        .map_err(AppError::Internal)?;
    let slots = initialize_plan(&state, &plan).await?;

    Ok(Json(CreatePlanResponse { plan, slots }))
}

/// GET /api/v1/plans/:id
pub async fn handle_get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<PlanDetailResponse>, AppError> {
    let plan = store::get_plan(&state.db, plan_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Plan {plan_id} not found")))?;

    let lessons = store::load_plan_lessons(&state.db, plan_id)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(PlanDetailResponse { plan, lessons }))
}

/// DELETE /api/v1/plans/:id
///
/// Whole-plan deletion; lesson slots cascade at the store.
pub async fn handle_delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = store::delete_plan(&state.db, plan_id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound(format!("Plan {plan_id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
