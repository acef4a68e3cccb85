use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::lesson::{LessonExerciseData, Phase};

/// Where the selected activity names come from. The caller resolves this once
/// and passes an explicit source instead of the service sniffing optional
/// fields off the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivitySource {
    /// Free-text construct field, comma-separated activity names.
    FreeText { text: String },
    /// Explicit per-phase activity detail picked in the wizard.
    ExplicitList { activities: Vec<SelectedActivity> },
    /// Raw catalog IDs needing one bulk lookup.
    IdReferences { ids: Vec<Uuid> },
}

/// One activity the user picked for a specific phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedActivity {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    pub phase: Phase,
}

/// A previously generated lesson, fed back as context for later slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorLesson {
    pub week_number: u32,
    pub lesson_number: u32,
    pub exercises: LessonExerciseData,
}

/// Position of the target lesson within a multi-week plan plus the history of
/// lessons generated so far. Its presence on a request switches the prompt
/// builder to multi-week mode, even with zero prior lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionContext {
    pub week_number: u32,
    pub lesson_number: u32,
    #[serde(default)]
    pub prior_lessons: Vec<PriorLesson>,
}

/// Everything needed to generate one lesson.
///
/// Invariant: the three phase durations are positive. Equipment and activity
/// sources may be empty; an empty activity list means "generate without
/// specific grounding".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub school_name: String,
    /// Grade 1-9.
    pub grade: u8,
    /// Display label for the construct; activity extraction goes through
    /// `activity_sources`.
    pub construct: String,
    pub environment: String,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub preparation_time: u32,
    pub main_time: u32,
    pub finish_time: u32,
    pub preparation_role: String,
    pub main_role: String,
    pub finish_role: String,
    #[serde(default)]
    pub activity_sources: Vec<ActivitySource>,
    /// Non-empty only for partial-phase regeneration: emit exercises for
    /// these phases and leave the others empty.
    #[serde(default)]
    pub selected_phases: Vec<Phase>,
    #[serde(default)]
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub week_number: Option<u32>,
    #[serde(default)]
    pub lesson_number: Option<u32>,
    /// Prior-lesson history for single-lesson requests tied to a plan slot.
    /// Multi-week requests carry their history inside `progression` instead.
    #[serde(default)]
    pub prior_lessons: Vec<PriorLesson>,
    #[serde(default)]
    pub progression: Option<ProgressionContext>,
}

impl GenerationRequest {
    pub fn phase_time(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Preparation => self.preparation_time,
            Phase::Main => self.main_time,
            Phase::Finish => self.finish_time,
        }
    }

    pub fn phase_role(&self, phase: Phase) -> &str {
        match phase {
            Phase::Preparation => &self.preparation_role,
            Phase::Main => &self.main_role,
            Phase::Finish => &self.finish_role,
        }
    }

    /// Explicitly selected activities for the given phase, across all
    /// `ExplicitList` sources. Used by the partial-regeneration pre-check.
    pub fn explicit_activities_for(&self, phase: Phase) -> Vec<&SelectedActivity> {
        self.activity_sources
            .iter()
            .filter_map(|s| match s {
                ActivitySource::ExplicitList { activities } => Some(activities.iter()),
                _ => None,
            })
            .flatten()
            .filter(|a| a.phase == phase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_source_tagged_serde() {
        let json = r#"{"type": "free_text", "text": "Běh, Skoky"}"#;
        let source: ActivitySource = serde_json::from_str(json).unwrap();
        assert!(matches!(source, ActivitySource::FreeText { ref text } if text == "Běh, Skoky"));

        let json = r#"{
            "type": "explicit_list",
            "activities": [{"name": "Přeskoky", "phase": "main"}]
        }"#;
        let source: ActivitySource = serde_json::from_str(json).unwrap();
        match source {
            ActivitySource::ExplicitList { activities } => {
                assert_eq!(activities[0].name, "Přeskoky");
                assert_eq!(activities[0].phase, Phase::Main);
            }
            other => panic!("unexpected source: {other:?}"),
        }
    }

    #[test]
    fn test_request_minimal_body_deserializes() {
        let json = serde_json::json!({
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
        });
        let request: GenerationRequest = serde_json::from_value(json).unwrap();
        assert!(request.activity_sources.is_empty());
        assert!(request.progression.is_none());
        assert_eq!(request.phase_time(Phase::Main), 25);
        assert_eq!(request.phase_role(Phase::Finish), "Uklidnění");
    }
}
