//! Context Builders — the three independent text blocks feeding the user
//! prompt: phase-scoped knowledge excerpts, the anti-repetition block, and
//! the progression-position block.
//!
//! All builders are pure string work over prefetched data. Each returns an
//! empty string when it has nothing to say, so the prompt builder can
//! concatenate unconditionally.

use crate::generation::budget::ContextBudget;
use crate::generation::prompts::{
    KNOWLEDGE_CHECKLIST_FULL, KNOWLEDGE_NOTE_CONDENSED, REPETITION_DIRECTIVE_CONDENSED,
    REPETITION_SELF_CHECK,
};
use crate::generation::PlanMode;
use crate::knowledge::{fuzzy_match, PhaseKnowledge};
use crate::models::lesson::Phase;
use crate::models::request::{PriorLesson, ProgressionContext};
use crate::models::settings::GenerationSettings;

/// Phase-scoped knowledge excerpts. Returns an empty string when no
/// activities were selected; otherwise one labeled block per phase, with an
/// explicit marker for phases that matched nothing.
pub fn knowledge_context(
    sections: &[PhaseKnowledge],
    activities: &[String],
    mode: PlanMode,
) -> String {
    if activities.is_empty() {
        return String::new();
    }

    let mut out = String::from("PODKLADY Z DATABÁZE CVIKŮ (rozdělené podle fází hodiny):\n");

    for phase in Phase::ALL {
        out.push_str(&format!("\n=== {} ({}) ===\n", phase.label_cs(), phase.as_str()));

        let chunks = sections
            .iter()
            .filter(|s| s.phase == phase)
            .flat_map(|s| s.chunks.iter())
            // The query already filters by phase; re-check here so a
            // mislabeled chunk can never cross into another phase's block.
            .filter(|c| c.exercise_phase.as_deref() == Some(phase.as_str()))
            .filter(|c| {
                c.activity_name
                    .as_deref()
                    .map(|name| activities.iter().any(|a| fuzzy_match(name, a)))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();

        if chunks.is_empty() {
            out.push_str("(žádné cviky nenalezeny pro tuto fázi)\n");
            continue;
        }

        for chunk in chunks {
            let name = chunk.activity_name.as_deref().unwrap_or("-");
            out.push_str(&format!(
                "- {}: {} (zdroj: {})\n",
                name, chunk.content, chunk.source_file
            ));
        }
    }

    out.push('\n');
    match mode {
        PlanMode::SingleLesson => out.push_str(KNOWLEDGE_CHECKLIST_FULL),
        PlanMode::MultiWeek => out.push_str(KNOWLEDGE_NOTE_CONDENSED),
    }
    out.push('\n');
    out
}

/// Case-insensitive, order-preserving set of every exercise name already used
/// in the given prior lessons.
pub fn used_exercise_names(prior: &[PriorLesson]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for lesson in prior {
        for name in lesson.exercises.exercise_names() {
            let lowered = name.trim().to_lowercase();
            if !lowered.is_empty() && !names.contains(&lowered) {
                names.push(lowered);
            }
        }
    }
    names
}

/// Anti-repetition block. Single-lesson mode enumerates the full forbidden
/// list with a self-check; multi-week mode lists at most
/// `budget.max_forbidden_names` names plus a remainder count. Empty prior
/// history yields an empty string.
pub fn repetition_context(
    prior: &[PriorLesson],
    mode: PlanMode,
    budget: &ContextBudget,
    tuning: Option<&GenerationSettings>,
) -> String {
    let names = used_exercise_names(prior);
    if names.is_empty() {
        return String::new();
    }

    match mode {
        PlanMode::SingleLesson => {
            let mut out = String::from("ZAKÁZANÉ CVIKY (již použité v předchozích hodinách):\n");
            for name in &names {
                out.push_str(&format!("- {name}\n"));
            }
            out.push_str(REPETITION_SELF_CHECK);
            out.push('\n');
            if let Some(settings) = tuning {
                out.push_str(&repetition_tuning_text(settings));
                out.push('\n');
            }
            out
        }
        PlanMode::MultiWeek => {
            let listed = names
                .iter()
                .take(budget.max_forbidden_names)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            let remainder = names.len().saturating_sub(budget.max_forbidden_names);
            let mut out = format!("JIŽ POUŽITÉ CVIKY: {listed}");
            if remainder > 0 {
                out.push_str(&format!(" (a dalších {remainder} cviků)"));
            }
            out.push_str(". ");
            out.push_str(REPETITION_DIRECTIVE_CONDENSED);
            out.push('\n');
            out
        }
    }
}

/// Plain-text rendering of the configured repetition limits.
pub fn repetition_tuning_text(settings: &GenerationSettings) -> String {
    format!(
        "LIMITY OPAKOVÁNÍ: každý cvik se smí v celém plánu objevit nejvýše {}×; \
        mezi dvěma použitími téhož cviku musí uplynout alespoň {} týdny.",
        settings.max_repetitions, settings.min_week_gap
    )
}

/// Progression-position block: where the lesson sits in the plan plus a
/// summary of prior lessons. Single-lesson mode emits the full history;
/// multi-week mode only the most recent lessons within the budget. `None`
/// yields an empty string.
pub fn progression_context(
    progression: Option<&ProgressionContext>,
    mode: PlanMode,
    budget: &ContextBudget,
) -> String {
    let Some(progression) = progression else {
        return String::new();
    };

    let mut out = format!(
        "POZICE V PLÁNU: týden {}, hodina {}.\n",
        progression.week_number, progression.lesson_number
    );

    if progression.prior_lessons.is_empty() {
        return out;
    }

    match mode {
        PlanMode::SingleLesson => {
            out.push_str("DOSAVADNÍ PRŮBĚH PLÁNU:\n");
            for lesson in &progression.prior_lessons {
                out.push_str(&format!(
                    "Týden {}, hodina {}:\n",
                    lesson.week_number, lesson.lesson_number
                ));
                for phase in Phase::ALL {
                    let items = lesson.exercises.phase(phase);
                    if items.is_empty() {
                        continue;
                    }
                    let names = items
                        .iter()
                        .map(|i| i.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    out.push_str(&format!("  {}: {}\n", phase.label_cs(), names));
                }
            }
        }
        PlanMode::MultiWeek => {
            out.push_str("POSLEDNÍ HODINY:\n");
            let skip = progression
                .prior_lessons
                .len()
                .saturating_sub(budget.recent_lessons);
            for lesson in progression.prior_lessons.iter().skip(skip) {
                let names = lesson
                    .exercises
                    .exercise_names()
                    .take(budget.names_per_recent_lesson)
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!(
                    "Týden {}, hodina {}: {}\n",
                    lesson.week_number, lesson.lesson_number, names
                ));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lesson::{ExerciseItem, LessonExerciseData};
    use crate::models::rows::KnowledgeChunkRow;
    use chrono::Utc;
    use uuid::Uuid;

    fn chunk(activity: &str, phase: &str) -> KnowledgeChunkRow {
        KnowledgeChunkRow {
            id: Uuid::new_v4(),
            content: format!("popis cviku {activity}"),
            source_file: "metodika.pdf".to_string(),
            activity_name: Some(activity.to_string()),
            exercise_phase: Some(phase.to_string()),
            created_at: Utc::now(),
        }
    }

    fn item(name: &str) -> ExerciseItem {
        ExerciseItem {
            name: name.to_string(),
            description: String::new(),
            time: 5,
            phase: None,
        }
    }

    fn prior(week: u32, lesson: u32, names: &[&str]) -> PriorLesson {
        PriorLesson {
            week_number: week,
            lesson_number: lesson,
            exercises: LessonExerciseData {
                preparation: vec![],
                main: names.iter().map(|n| item(n)).collect(),
                finish: vec![],
            },
        }
    }

    fn sections(chunks: Vec<(Phase, KnowledgeChunkRow)>) -> Vec<PhaseKnowledge> {
        Phase::ALL
            .into_iter()
            .map(|phase| PhaseKnowledge {
                phase,
                chunks: chunks
                    .iter()
                    .filter(|(p, _)| *p == phase)
                    .map(|(_, c)| c.clone())
                    .collect(),
            })
            .collect()
    }

    #[test]
    fn test_knowledge_context_empty_without_activities() {
        let sections = sections(vec![(Phase::Main, chunk("Běh", "main"))]);
        assert_eq!(knowledge_context(&sections, &[], PlanMode::SingleLesson), "");
    }

    #[test]
    fn test_knowledge_context_marks_phases_without_matches() {
        let sections = sections(vec![(Phase::Main, chunk("Běh na 60 m", "main"))]);
        let out = knowledge_context(
            &sections,
            &["Běh".to_string()],
            PlanMode::SingleLesson,
        );
        assert!(out.contains("Běh na 60 m"));
        // preparation and finish matched nothing
        assert_eq!(out.matches("žádné cviky nenalezeny").count(), 2);
        assert!(out.contains("KONTROLA PŘED ODESLÁNÍM"));
    }

    #[test]
    fn test_knowledge_context_never_crosses_phases() {
        // A preparation-tagged chunk smuggled into the main section must not
        // appear in the main block even though its name matches.
        let smuggled = chunk("Běh", "preparation");
        let sections = vec![
            PhaseKnowledge {
                phase: Phase::Preparation,
                chunks: vec![],
            },
            PhaseKnowledge {
                phase: Phase::Main,
                chunks: vec![smuggled],
            },
            PhaseKnowledge {
                phase: Phase::Finish,
                chunks: vec![],
            },
        ];
        let out = knowledge_context(&sections, &["Běh".to_string()], PlanMode::SingleLesson);
        let main_block = out
            .split("=== Hlavní část")
            .nth(1)
            .unwrap()
            .split("=== Závěrečná část")
            .next()
            .unwrap();
        assert!(main_block.contains("žádné cviky nenalezeny"));
        assert!(!main_block.contains("metodika.pdf"));
    }

    #[test]
    fn test_knowledge_context_condensed_for_multi_week() {
        let sections = sections(vec![(Phase::Main, chunk("Běh", "main"))]);
        let out = knowledge_context(&sections, &["Běh".to_string()], PlanMode::MultiWeek);
        assert!(out.contains(KNOWLEDGE_NOTE_CONDENSED));
        assert!(!out.contains("KONTROLA PŘED ODESLÁNÍM"));
    }

    #[test]
    fn test_repetition_context_lowercases_names() {
        let out = repetition_context(
            &[prior(1, 1, &["Skoky"])],
            PlanMode::SingleLesson,
            &ContextBudget::default(),
            None,
        );
        assert!(out.contains("skoky"));
        assert!(!out.contains("Skoky"));
        assert!(out.contains("KONTROLA OPAKOVÁNÍ"));
    }

    #[test]
    fn test_repetition_context_empty_without_prior_lessons() {
        let out = repetition_context(
            &[],
            PlanMode::SingleLesson,
            &ContextBudget::default(),
            None,
        );
        assert_eq!(out, "");
    }

    #[test]
    fn test_repetition_context_caps_multi_week_list_with_remainder() {
        let names: Vec<String> = (0..27).map(|i| format!("cvik-{i:02}")).collect();
        let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let out = repetition_context(
            &[prior(1, 1, &name_refs)],
            PlanMode::MultiWeek,
            &ContextBudget::default(),
            None,
        );
        assert!(out.contains("cvik-19"));
        assert!(!out.contains("cvik-20"));
        assert!(out.contains("a dalších 7 cviků"));
        assert!(out.contains(REPETITION_DIRECTIVE_CONDENSED));
    }

    #[test]
    fn test_repetition_tuning_appended_in_single_mode_only_when_supplied() {
        let settings = GenerationSettings::default();
        let with = repetition_context(
            &[prior(1, 1, &["Skoky"])],
            PlanMode::SingleLesson,
            &ContextBudget::default(),
            Some(&settings),
        );
        assert!(with.contains("LIMITY OPAKOVÁNÍ"));

        let without = repetition_context(
            &[prior(1, 1, &["Skoky"])],
            PlanMode::SingleLesson,
            &ContextBudget::default(),
            None,
        );
        assert!(!without.contains("LIMITY OPAKOVÁNÍ"));
    }

    #[test]
    fn test_progression_context_none_is_empty() {
        let out = progression_context(None, PlanMode::SingleLesson, &ContextBudget::default());
        assert_eq!(out, "");
    }

    #[test]
    fn test_progression_context_multi_week_respects_budget() {
        let progression = ProgressionContext {
            week_number: 4,
            lesson_number: 2,
            prior_lessons: vec![
                prior(1, 1, &["a", "b", "c", "d"]),
                prior(2, 1, &["e"]),
                prior(3, 1, &["f"]),
                prior(4, 1, &["g", "h", "i", "j", "k"]),
            ],
        };
        let out = progression_context(
            Some(&progression),
            PlanMode::MultiWeek,
            &ContextBudget::default(),
        );
        assert!(out.contains("POZICE V PLÁNU: týden 4, hodina 2"));
        // Oldest lesson falls outside the 3-lesson window.
        assert!(!out.contains("Týden 1"));
        // At most three names per summarized lesson.
        assert!(out.contains("g, h, i"));
        assert!(!out.contains('j'));
    }

    #[test]
    fn test_progression_context_single_mode_emits_full_history() {
        let progression = ProgressionContext {
            week_number: 3,
            lesson_number: 1,
            prior_lessons: vec![
                prior(1, 1, &["Skoky", "Běh"]),
                prior(2, 1, &["Přihrávky"]),
            ],
        };
        let out = progression_context(
            Some(&progression),
            PlanMode::SingleLesson,
            &ContextBudget::default(),
        );
        assert!(out.contains("Týden 1, hodina 1"));
        assert!(out.contains("Skoky, Běh"));
        assert!(out.contains("Týden 2, hodina 1"));
        assert!(out.contains("Přihrávky"));
    }
}
