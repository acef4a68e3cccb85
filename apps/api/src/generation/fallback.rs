//! Deterministic fallback plan, substituted when the provider call or the
//! response processing fails so the UI always has something to render.
//!
//! Fixed template exercises per phase, proportioned to the requested phase
//! durations by fixed ratios. One builder for every call path; the phase tag
//! is always populated.

use crate::models::lesson::{ExerciseItem, LessonExerciseData, Phase};
use crate::models::request::GenerationRequest;

/// Template: exercise name, description, and its weight in the duration split.
struct Template {
    name: &'static str,
    description: &'static str,
    weight: u32,
}

const PREPARATION_TEMPLATES: [Template; 2] = [
    Template {
        name: "Lehký poklus s vyklusáním",
        description: "Žáci klušou volným tempem po obvodu cvičební plochy, na signál \
            učitele mění směr. Tempo volte tak, aby všichni stačili. Výborně, rozehřátí zvládáme!",
        weight: 1,
    },
    Template {
        name: "Dynamický strečink",
        description: "Kroužení pažemi, výpady s rotací trupu, švihy nohou u žebřin. \
            Každý cvik 8 opakování na obě strany. Krásně protažené, jde se na věc!",
        weight: 1,
    },
];

const MAIN_TEMPLATES: [Template; 3] = [
    Template {
        name: "Průpravná cvičení s náčiním",
        description: "Žáci ve dvojicích procvičují základní dovednosti s dostupným náčiním, \
            učitel obchází a opravuje techniku. Dbejte na dostatečné rozestupy. \
            Vidím samé šikovné sportovce!",
        weight: 2,
    },
    Template {
        name: "Herní činnost družstev",
        description: "Třída se rozdělí na družstva a hraje zjednodušenou hru podle pravidel \
            přiměřených ročníku. Učitel rozhoduje a dbá na fair play. Hrajete jako jeden tým, jen tak dál!",
        weight: 2,
    },
    Template {
        name: "Štafetová soutěž",
        description: "Družstva soutěží ve štafetě přes vyznačenou dráhu, předávka dotykem dlaně. \
            Pozor na bezpečný doběh za cílovou čárou. Skvělé nasazení, finiš jako na olympiádě!",
        weight: 1,
    },
];

const FINISH_TEMPLATES: [Template; 2] = [
    Template {
        name: "Klidná chůze s dechovými cvičeními",
        description: "Pomalá chůze po kruhu, nádech nosem s upažením, výdech ústy s připažením. \
            Tep se postupně zklidňuje. Dýcháme krásně zhluboka, výborná práce!",
        weight: 1,
    },
    Template {
        name: "Protažení hlavních svalových skupin",
        description: "Statické protažení lýtek, stehen, zad a paží, každou pozici držet 15 sekund. \
            Protahujeme se do mírného tahu, nikdy do bolesti. Dnes jste makali, zasloužíte pochvalu!",
        weight: 1,
    },
];

/// Builds the fallback lesson. Within each phase the item times are a
/// fixed-ratio split of the requested duration and never sum above it.
pub fn fallback_plan(request: &GenerationRequest) -> LessonExerciseData {
    LessonExerciseData {
        preparation: fill_phase(
            &PREPARATION_TEMPLATES,
            request.preparation_time,
            Phase::Preparation,
        ),
        main: fill_phase(&MAIN_TEMPLATES, request.main_time, Phase::Main),
        finish: fill_phase(&FINISH_TEMPLATES, request.finish_time, Phase::Finish),
    }
}

fn fill_phase(templates: &[Template], duration: u32, phase: Phase) -> Vec<ExerciseItem> {
    let total_weight: u32 = templates.iter().map(|t| t.weight).sum();
    let mut remaining = duration;
    let mut items = Vec::with_capacity(templates.len());

    for template in templates {
        if remaining == 0 {
            break;
        }
        let share = (duration * template.weight / total_weight).max(1);
        let time = share.min(remaining);
        remaining -= time;
        items.push(ExerciseItem {
            name: template.name.to_string(),
            description: template.description.to_string(),
            time,
            phase: Some(phase),
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prep: u32, main: u32, finish: u32) -> GenerationRequest {
        serde_json::from_value(serde_json::json!({
            "school_name": "ZŠ Test",
            "grade": 3,
            "construct": "Míč",
            "environment": "Tělocvična",
            "equipment": [],
            "preparation_time": prep,
            "main_time": main,
            "finish_time": finish,
            "preparation_role": "Rozcvička",
            "main_role": "Hlavní aktivita",
            "finish_role": "Uklidnění"
        }))
        .unwrap()
    }

    fn phase_sum(items: &[ExerciseItem]) -> u32 {
        items.iter().map(|i| i.time).sum()
    }

    #[test]
    fn test_all_phases_nonempty_and_within_duration() {
        let req = request(10, 25, 10);
        let plan = fallback_plan(&req);

        assert!(plan.is_complete());
        assert!(phase_sum(&plan.preparation) <= 10);
        assert!(phase_sum(&plan.main) <= 25);
        assert!(phase_sum(&plan.finish) <= 10);
    }

    #[test]
    fn test_phase_tag_always_populated() {
        let plan = fallback_plan(&request(10, 25, 10));
        for phase in Phase::ALL {
            assert!(plan.phase(phase).iter().all(|i| i.phase == Some(phase)));
        }
    }

    #[test]
    fn test_item_times_are_positive() {
        let plan = fallback_plan(&request(10, 25, 10));
        for phase in Phase::ALL {
            assert!(plan.phase(phase).iter().all(|i| i.time > 0));
        }
    }

    #[test]
    fn test_tiny_durations_stay_within_budget() {
        for duration in 1..=5 {
            let plan = fallback_plan(&request(duration, duration, duration));
            for phase in Phase::ALL {
                let items = plan.phase(phase);
                assert!(!items.is_empty());
                assert!(phase_sum(items) <= duration, "phase {phase:?} overflows {duration}");
            }
        }
    }

    #[test]
    fn test_main_phase_split_follows_fixed_ratios() {
        let plan = fallback_plan(&request(10, 25, 10));
        let times: Vec<u32> = plan.main.iter().map(|i| i.time).collect();
        assert_eq!(times, vec![10, 10, 5]);
    }
}
