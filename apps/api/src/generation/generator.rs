//! Generation orchestration.
//!
//! Flow: load settings → resolve activities → load knowledge → build prompt →
//! provider call → process response → persist → report.
//!
//! The umbrella entry point never fails the request outright: configuration
//! gaps return no lesson plus a notification, and transport or parse failures
//! substitute the deterministic fallback plan so the UI always has something
//! to render. Whole-plan initialization differs: a failed first lesson is
//! captured into the slot record instead of surfaced as a fallback.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::activity::extract_activities;
use crate::generation::budget::ContextBudget;
use crate::generation::fallback::fallback_plan;
use crate::generation::processor::process_response;
use crate::generation::prompt_builder::{build_prompt, BuiltPrompt};
use crate::knowledge::{load_phase_knowledge, PhaseKnowledge};
use crate::models::lesson::LessonExerciseData;
use crate::models::request::{ActivitySource, GenerationRequest, ProgressionContext};
use crate::models::rows::PlanRow;
use crate::models::settings::{AiProvider, AiSettingsRow, GenerationSettings};
use crate::models::Notification;
use crate::plans::store;
use crate::providers::{provider_for, ChatProvider};
use crate::settings::{load_ai_settings, load_generation_settings};
use crate::state::AppState;

/// Result of one generation attempt. `lesson` is `None` when a configuration
/// gate stopped the request before any network call.
#[derive(Debug, Serialize)]
pub struct GenerationOutcome {
    pub lesson: Option<LessonExerciseData>,
    pub fallback_used: bool,
    #[serde(skip)]
    pub prompt: Option<BuiltPrompt>,
    pub notifications: Vec<Notification>,
}

impl GenerationOutcome {
    fn aborted(notification: Notification) -> Self {
        Self {
            lesson: None,
            fallback_used: false,
            prompt: None,
            notifications: vec![notification],
        }
    }
}

/// Status of one lesson slot in a plan grid.
#[derive(Debug, Clone, Serialize)]
pub struct SlotStatus {
    pub week_number: i32,
    pub lesson_number: i32,
    pub has_exercises: bool,
    pub is_generating: bool,
    pub error: Option<String>,
}

/// Core generation chain over preloaded inputs. Pure of database access so
/// the configuration gates and failure paths are testable with a stub
/// provider.
pub async fn run_generation(
    client: &reqwest::Client,
    provider: &dyn ChatProvider,
    ai: Option<&AiSettingsRow>,
    tuning: &GenerationSettings,
    budget: &ContextBudget,
    request: &GenerationRequest,
    activities: &[String],
    knowledge: &[PhaseKnowledge],
) -> GenerationOutcome {
    // Configuration gates fire before any network call.
    let Some(ai) = ai else {
        return GenerationOutcome::aborted(Notification::error(
            "AI je deaktivována",
            "Nastavení AI nebylo nalezeno. Nakonfigurujte poskytovatele v administraci.",
        ));
    };
    if !ai.enabled {
        return GenerationOutcome::aborted(Notification::error(
            "AI je deaktivována",
            "Generování je vypnuté. Zapněte AI v nastavení administrace.",
        ));
    }
    if ai.api_key.trim().is_empty() {
        return GenerationOutcome::aborted(Notification::error(
            "Chybí API klíč",
            "Doplňte API klíč poskytovatele v nastavení administrace.",
        ));
    }
    if ai.provider().is_none() {
        return GenerationOutcome::aborted(Notification::error(
            "Neznámý poskytovatel AI",
            format!("Poskytovatel '{}' není podporován.", ai.provider),
        ));
    }

    // Partial-phase regeneration with no grounding activities is not an
    // error; short-circuit before spending a model call.
    if !request.selected_phases.is_empty() {
        let has_grounding = request
            .selected_phases
            .iter()
            .any(|p| !request.explicit_activities_for(*p).is_empty());
        if !has_grounding {
            return GenerationOutcome::aborted(Notification::info(
                "Žádné aktivity pro vybrané fáze",
                "Pro vybrané části hodiny nejsou zvolené žádné aktivity.",
            ));
        }
    }

    let prompt = build_prompt(
        request,
        activities,
        knowledge,
        ai.system_prompt.as_deref(),
        Some(tuning),
        budget,
    );

    let raw = match provider
        .complete(client, ai, &prompt, request.plan_id)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "provider call failed, substituting fallback plan");
            return GenerationOutcome {
                lesson: Some(fallback_plan(request)),
                fallback_used: true,
                prompt: Some(prompt),
                notifications: vec![Notification::error(
                    "Generování selhalo",
                    format!("Volání AI se nezdařilo ({e}). Byla použita záložní hodina."),
                )],
            };
        }
    };

    match process_response(&raw) {
        Ok(lesson) => GenerationOutcome {
            lesson: Some(lesson),
            fallback_used: false,
            prompt: Some(prompt),
            notifications: vec![],
        },
        Err(e) => {
            warn!(error = %e, "response processing failed, substituting fallback plan");
            GenerationOutcome {
                lesson: Some(fallback_plan(request)),
                fallback_used: true,
                prompt: Some(prompt),
                notifications: vec![Notification::error(
                    "Neplatná odpověď AI",
                    format!("Odpověď modelu se nepodařilo zpracovat ({e}). Byla použita záložní hodina."),
                )],
            }
        }
    }
}

/// Umbrella single-lesson generation.
///
/// Steps:
/// 1. Fill prior-lesson history from the store when the request targets a
///    plan slot and the caller did not supply it.
/// 2. Resolve activities from the explicit sources (one bulk lookup at most).
/// 3. Load phase-scoped knowledge only when activities resolved.
/// 4. Load settings, run the core chain.
/// 5. Persist a non-fallback result into its slot.
pub async fn generate_single_lesson(
    state: &AppState,
    mut request: GenerationRequest,
) -> Result<GenerationOutcome, AppError> {
    if let (Some(plan_id), Some(week), Some(lesson)) =
        (request.plan_id, request.week_number, request.lesson_number)
    {
        if request.prior_lessons.is_empty() {
            let rows = store::load_lessons_before(&state.db, plan_id, week as i32, lesson as i32)
                .await
                .map_err(AppError::Internal)?;
            request.prior_lessons = store::to_prior_lessons(&rows);
        }
    }

    let activities = extract_activities(&state.db, &request.activity_sources)
        .await
        .map_err(AppError::Internal)?;

    let knowledge = if activities.is_empty() {
        Vec::new()
    } else {
        load_phase_knowledge(&state.db)
            .await
            .map_err(AppError::Internal)?
    };

    let ai = load_ai_settings(&state.db)
        .await
        .map_err(AppError::Internal)?;
    let tuning = load_generation_settings(&state.db)
        .await
        .map_err(AppError::Internal)?;

    let provider = provider_for(
        ai.as_ref()
            .and_then(|row| row.provider())
            .unwrap_or(AiProvider::OpenAi),
    );

    let budget = ContextBudget::default();
    let outcome = run_generation(
        &state.http,
        provider,
        ai.as_ref(),
        &tuning,
        &budget,
        &request,
        &activities,
        &knowledge,
    )
    .await;

    if let (Some(lesson), Some(plan_id), Some(week), Some(lesson_no)) = (
        outcome.lesson.as_ref().filter(|_| !outcome.fallback_used),
        request.plan_id,
        request.week_number,
        request.lesson_number,
    ) {
        store::upsert_lesson(
            &state.db,
            plan_id,
            week as i32,
            lesson_no as i32,
            lesson,
            outcome.prompt.as_ref(),
        )
        .await
        .map_err(AppError::Internal)?;
    }

    Ok(outcome)
}

/// On-demand generation of one slot of a multi-week plan. Prior-lesson
/// context is re-derived from the store by slot order, so later slots see all
/// earlier ones regardless of the order they were generated in.
pub async fn generate_plan_slot(
    state: &AppState,
    plan_id: Uuid,
    week_number: u32,
    lesson_number: u32,
) -> Result<GenerationOutcome, AppError> {
    let plan = store::get_plan(&state.db, plan_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Plan {plan_id} not found")))?;

    let prior_rows =
        store::load_lessons_before(&state.db, plan_id, week_number as i32, lesson_number as i32)
            .await
            .map_err(AppError::Internal)?;

    let request = plan_slot_request(&plan, week_number, lesson_number, store::to_prior_lessons(&prior_rows));

    let activities = extract_activities(&state.db, &request.activity_sources)
        .await
        .map_err(AppError::Internal)?;
    let knowledge = if activities.is_empty() {
        Vec::new()
    } else {
        load_phase_knowledge(&state.db)
            .await
            .map_err(AppError::Internal)?
    };

    let ai = load_ai_settings(&state.db)
        .await
        .map_err(AppError::Internal)?;
    let tuning = load_generation_settings(&state.db)
        .await
        .map_err(AppError::Internal)?;
    let provider = provider_for(
        ai.as_ref()
            .and_then(|row| row.provider())
            .unwrap_or(AiProvider::OpenAi),
    );

    let budget = ContextBudget::default();
    let outcome = run_generation(
        &state.http,
        provider,
        ai.as_ref(),
        &tuning,
        &budget,
        &request,
        &activities,
        &knowledge,
    )
    .await;

    if let Some(lesson) = outcome.lesson.as_ref().filter(|_| !outcome.fallback_used) {
        store::upsert_lesson(
            &state.db,
            plan_id,
            week_number as i32,
            lesson_number as i32,
            lesson,
            outcome.prompt.as_ref(),
        )
        .await
        .map_err(AppError::Internal)?;
    }

    Ok(outcome)
}

/// Whole-plan initialization. Only slot (1, 1) is generated automatically —
/// the model call is slow and expensive, so the UI drives the remaining slots
/// on demand. Already-persisted slots passing the phase-presence check are
/// treated as complete; a malformed payload counts as an empty slot.
pub async fn initialize_plan(state: &AppState, plan: &PlanRow) -> Result<Vec<SlotStatus>, AppError> {
    let existing = store::load_plan_lessons(&state.db, plan.id)
        .await
        .map_err(AppError::Internal)?;

    let slot_filled = |week: i32, lesson: i32| {
        existing
            .iter()
            .find(|r| r.week_number == week && r.lesson_number == lesson)
            .map(|r| r.has_complete_exercises())
            .unwrap_or(false)
    };

    let mut first_slot_error: Option<String> = None;
    let mut first_slot_generated = false;

    if !slot_filled(1, 1) {
        info!(plan_id = %plan.id, "generating first lesson of new plan");
        let request = plan_slot_request(plan, 1, 1, Vec::new());

        let activities = extract_activities(&state.db, &request.activity_sources)
            .await
            .map_err(AppError::Internal)?;
        let knowledge = if activities.is_empty() {
            Vec::new()
        } else {
            load_phase_knowledge(&state.db)
                .await
                .map_err(AppError::Internal)?
        };
        let ai = load_ai_settings(&state.db)
            .await
            .map_err(AppError::Internal)?;
        let tuning = load_generation_settings(&state.db)
            .await
            .map_err(AppError::Internal)?;
        let provider = provider_for(
            ai.as_ref()
                .and_then(|row| row.provider())
                .unwrap_or(AiProvider::OpenAi),
        );

        let budget = ContextBudget::default();
        let outcome = run_generation(
            &state.http,
            provider,
            ai.as_ref(),
            &tuning,
            &budget,
            &request,
            &activities,
            &knowledge,
        )
        .await;

        match outcome.lesson.as_ref().filter(|_| !outcome.fallback_used) {
            Some(lesson) => {
                store::upsert_lesson(&state.db, plan.id, 1, 1, lesson, outcome.prompt.as_ref())
                    .await
                    .map_err(AppError::Internal)?;
                first_slot_generated = true;
            }
            None => {
                // Captured into the slot record rather than thrown, so the
                // caller can render an inline retry affordance.
                let message = outcome
                    .notifications
                    .first()
                    .map(|n| n.description.clone())
                    .unwrap_or_else(|| "Generování první hodiny selhalo.".to_string());
                store::record_slot_error(&state.db, plan.id, 1, 1, &message)
                    .await
                    .map_err(AppError::Internal)?;
                first_slot_error = Some(message);
            }
        }
    } else {
        first_slot_generated = true;
    }

    let mut slots = Vec::with_capacity((plan.weeks_count * plan.lessons_per_week).max(0) as usize);
    for week in 1..=plan.weeks_count.max(0) {
        for lesson in 1..=plan.lessons_per_week.max(0) {
            let is_first = week == 1 && lesson == 1;
            slots.push(SlotStatus {
                week_number: week,
                lesson_number: lesson,
                has_exercises: if is_first {
                    first_slot_generated
                } else {
                    slot_filled(week, lesson)
                },
                is_generating: false,
                error: if is_first {
                    first_slot_error.clone()
                } else {
                    None
                },
            });
        }
    }

    Ok(slots)
}

/// Builds the multi-week generation request for one slot of a plan. The
/// progression context is always attached, even for the very first lesson
/// with empty history, which is what switches the prompt to multi-week mode.
fn plan_slot_request(
    plan: &PlanRow,
    week_number: u32,
    lesson_number: u32,
    prior_lessons: Vec<crate::models::request::PriorLesson>,
) -> GenerationRequest {
    GenerationRequest {
        school_name: plan.school_name.clone(),
        grade: plan.grade.clamp(1, 9) as u8,
        construct: plan.construct.clone(),
        environment: plan.environment.clone(),
        equipment: plan.equipment.clone(),
        preparation_time: plan.preparation_time.max(0) as u32,
        main_time: plan.main_time.max(0) as u32,
        finish_time: plan.finish_time.max(0) as u32,
        preparation_role: plan.preparation_role.clone(),
        main_role: plan.main_role.clone(),
        finish_role: plan.finish_role.clone(),
        activity_sources: vec![ActivitySource::FreeText {
            text: plan.construct.clone(),
        }],
        selected_phases: Vec::new(),
        plan_id: Some(plan.id),
        week_number: Some(week_number),
        lesson_number: Some(lesson_number),
        prior_lessons: Vec::new(),
        progression: Some(ProgressionContext {
            week_number,
            lesson_number,
            prior_lessons,
        }),
    }
}
