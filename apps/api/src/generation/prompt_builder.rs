//! Prompt Builder — merges the admin-configured base system prompt with the
//! structural contract and concatenates the three context blocks into the
//! user prompt.
//!
//! Lengths are logged but never capped here; the context builders own size
//! control.

use tracing::debug;

use crate::generation::budget::ContextBudget;
use crate::generation::context::{knowledge_context, progression_context, repetition_context};
use crate::generation::prompts::{
    CLOSING_REMINDER, DEFAULT_SYSTEM_PROMPT, PARTIAL_PHASE_TEMPLATE, RUBRIC_COMPRESSED,
    RUBRIC_FULL, STRUCTURE_CONTRACT,
};
use crate::generation::PlanMode;
use crate::knowledge::PhaseKnowledge;
use crate::models::lesson::Phase;
use crate::models::request::{GenerationRequest, ProgressionContext};
use crate::models::settings::GenerationSettings;

/// The assembled system/user prompt pair, kept alongside the persisted lesson
/// for debugging.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BuiltPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Multi-week iff the request carries a progression context, even one with
/// zero prior lessons.
pub fn plan_mode(request: &GenerationRequest) -> PlanMode {
    if request.progression.is_some() {
        PlanMode::MultiWeek
    } else {
        PlanMode::SingleLesson
    }
}

pub fn build_prompt(
    request: &GenerationRequest,
    activities: &[String],
    knowledge: &[PhaseKnowledge],
    base_system_prompt: Option<&str>,
    tuning: Option<&GenerationSettings>,
    budget: &ContextBudget,
) -> BuiltPrompt {
    let mode = plan_mode(request);

    let base = base_system_prompt
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    // Generation tuning applies to single-lesson requests only.
    let tuning = match mode {
        PlanMode::SingleLesson => tuning,
        PlanMode::MultiWeek => None,
    };

    let prior = request
        .progression
        .as_ref()
        .map(|p| p.prior_lessons.as_slice())
        .unwrap_or(&request.prior_lessons);

    let knowledge_block = knowledge_context(knowledge, activities, mode);
    let repetition_block = repetition_context(prior, mode, budget, tuning);

    // Single-lesson requests tied to a plan slot still get a position block,
    // synthesized from the slot indices and the loaded history.
    let synthesized;
    let progression_ref: Option<&ProgressionContext> = match &request.progression {
        Some(p) => Some(p),
        None => match (request.week_number, request.lesson_number) {
            (Some(week), Some(lesson)) => {
                synthesized = ProgressionContext {
                    week_number: week,
                    lesson_number: lesson,
                    prior_lessons: request.prior_lessons.clone(),
                };
                Some(&synthesized)
            }
            _ => None,
        },
    };
    let progression_block = progression_context(progression_ref, mode, budget);

    let system_prompt = compose_system_prompt(base, mode, tuning);
    let user_prompt = compose_user_prompt(
        request,
        &knowledge_block,
        &repetition_block,
        &progression_block,
    );

    debug!(
        mode = ?mode,
        system_chars = system_prompt.len(),
        user_chars = user_prompt.len(),
        "prompt assembled"
    );

    BuiltPrompt {
        system_prompt,
        user_prompt,
    }
}

fn compose_system_prompt(
    base: &str,
    mode: PlanMode,
    tuning: Option<&GenerationSettings>,
) -> String {
    let mut out = String::from(base);
    out.push_str("\n\n");
    out.push_str(STRUCTURE_CONTRACT);
    out.push_str("\n\n");
    out.push_str(match mode {
        PlanMode::SingleLesson => RUBRIC_FULL,
        PlanMode::MultiWeek => RUBRIC_COMPRESSED,
    });
    if let Some(settings) = tuning {
        out.push_str("\n\n");
        out.push_str(&generation_tuning_text(settings));
    }
    out
}

fn compose_user_prompt(
    request: &GenerationRequest,
    knowledge_block: &str,
    repetition_block: &str,
    progression_block: &str,
) -> String {
    let equipment = if request.equipment.is_empty() {
        "žádné".to_string()
    } else {
        request.equipment.join(", ")
    };

    let mut out = format!(
        "PARAMETRY HODINY:\n\
        Škola: {}\n\
        Ročník: {}.\n\
        Tematický celek: {}\n\
        Prostředí: {}\n\
        Vybavení: {}\n\n\
        STAVBA HODINY:\n",
        request.school_name, request.grade, request.construct, request.environment, equipment
    );

    for phase in Phase::ALL {
        out.push_str(&format!(
            "- {}: {} min — role: {}\n",
            phase.label_cs(),
            request.phase_time(phase),
            request.phase_role(phase)
        ));
    }

    for block in [knowledge_block, repetition_block, progression_block] {
        if !block.is_empty() {
            out.push('\n');
            out.push_str(block);
        }
    }

    if !request.selected_phases.is_empty() {
        let labels = request
            .selected_phases
            .iter()
            .map(|p| p.label_cs())
            .collect::<Vec<_>>()
            .join(", ");
        out.push('\n');
        out.push_str(&PARTIAL_PHASE_TEMPLATE.replace("{phases}", &labels));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(CLOSING_REMINDER);
    out
}

/// Plain-text rendering of the per-phase exercise-count ranges and the
/// progression coefficient, appended to single-lesson system prompts.
fn generation_tuning_text(settings: &GenerationSettings) -> String {
    format!(
        "NASTAVENÍ GENEROVÁNÍ: přípravná část {}–{} cviků, hlavní část {}–{} cviků, \
        závěrečná část {}–{} cviků. Obtížnost zvyšuj postupně mezi hodinami \
        (koeficient progrese {}).",
        settings.min_exercises_preparation,
        settings.max_exercises_preparation,
        settings.min_exercises_main,
        settings.max_exercises_main,
        settings.min_exercises_finish,
        settings.max_exercises_finish,
        settings.progression_coefficient
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::PriorLesson;

    fn request() -> GenerationRequest {
        serde_json::from_value(serde_json::json!({
            "school_name": "ZŠ Test",
            "grade": 3,
            "construct": "Míč",
            "environment": "Tělocvična",
            "equipment": ["Míče"],
            "preparation_time": 10,
            "main_time": 25,
            "finish_time": 10,
            "preparation_role": "Rozcvička",
            "main_role": "Hlavní aktivita",
            "finish_role": "Uklidnění"
        }))
        .unwrap()
    }

    #[test]
    fn test_mode_detection_via_progression_presence() {
        let mut req = request();
        assert_eq!(plan_mode(&req), PlanMode::SingleLesson);

        req.progression = Some(ProgressionContext {
            week_number: 1,
            lesson_number: 1,
            prior_lessons: vec![],
        });
        assert_eq!(plan_mode(&req), PlanMode::MultiWeek);
    }

    #[test]
    fn test_default_system_prompt_when_base_missing_or_blank() {
        let req = request();
        let budget = ContextBudget::default();
        let prompt = build_prompt(&req, &[], &[], None, None, &budget);
        assert!(prompt.system_prompt.starts_with(DEFAULT_SYSTEM_PROMPT));

        let prompt = build_prompt(&req, &[], &[], Some("   "), None, &budget);
        assert!(prompt.system_prompt.starts_with(DEFAULT_SYSTEM_PROMPT));

        let prompt = build_prompt(&req, &[], &[], Some("Vlastní prompt."), None, &budget);
        assert!(prompt.system_prompt.starts_with("Vlastní prompt."));
    }

    #[test]
    fn test_system_prompt_carries_contract_and_rubric_by_mode() {
        let req = request();
        let budget = ContextBudget::default();
        let single = build_prompt(&req, &[], &[], None, None, &budget);
        assert!(single.system_prompt.contains("PRAVIDLA IZOLACE FÁZÍ"));
        assert!(single.system_prompt.contains("POŽADAVKY NA POPIS"));

        let mut req = request();
        req.progression = Some(ProgressionContext {
            week_number: 2,
            lesson_number: 1,
            prior_lessons: vec![],
        });
        let multi = build_prompt(&req, &[], &[], None, None, &budget);
        assert!(multi.system_prompt.contains(RUBRIC_COMPRESSED));
        assert!(!multi.system_prompt.contains("POŽADAVKY NA POPIS"));
    }

    #[test]
    fn test_tuning_text_single_lesson_only() {
        let settings = GenerationSettings::default();
        let budget = ContextBudget::default();

        let single = build_prompt(&request(), &[], &[], None, Some(&settings), &budget);
        assert!(single.system_prompt.contains("NASTAVENÍ GENEROVÁNÍ"));

        let mut req = request();
        req.progression = Some(ProgressionContext {
            week_number: 1,
            lesson_number: 1,
            prior_lessons: vec![],
        });
        let multi = build_prompt(&req, &[], &[], None, Some(&settings), &budget);
        assert!(!multi.system_prompt.contains("NASTAVENÍ GENEROVÁNÍ"));
    }

    #[test]
    fn test_user_prompt_basic_parameters_and_reminder() {
        let prompt = build_prompt(&request(), &[], &[], None, None, &ContextBudget::default());
        assert!(prompt.user_prompt.contains("Škola: ZŠ Test"));
        assert!(prompt.user_prompt.contains("Ročník: 3."));
        assert!(prompt.user_prompt.contains("Vybavení: Míče"));
        assert!(prompt
            .user_prompt
            .contains("Hlavní část: 25 min — role: Hlavní aktivita"));
        assert!(prompt.user_prompt.ends_with(CLOSING_REMINDER));
    }

    #[test]
    fn test_partial_phase_instruction_lists_phase_labels() {
        let mut req = request();
        req.selected_phases = vec![Phase::Main, Phase::Finish];
        let prompt = build_prompt(&req, &[], &[], None, None, &ContextBudget::default());
        assert!(prompt.user_prompt.contains("ČÁSTEČNÉ GENEROVÁNÍ"));
        assert!(prompt
            .user_prompt
            .contains("Hlavní část, Závěrečná část"));
    }

    #[test]
    fn test_single_lesson_slot_gets_position_block_with_history() {
        let mut req = request();
        req.week_number = Some(2);
        req.lesson_number = Some(1);
        req.prior_lessons = vec![PriorLesson {
            week_number: 1,
            lesson_number: 1,
            exercises: Default::default(),
        }];
        let prompt = build_prompt(&req, &[], &[], None, None, &ContextBudget::default());
        assert!(prompt
            .user_prompt
            .contains("POZICE V PLÁNU: týden 2, hodina 1"));
    }
}
