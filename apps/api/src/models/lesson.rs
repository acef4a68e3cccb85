use serde::{Deserialize, Serialize};

/// The three fixed phases of a PE lesson. Wire names match the JSON contract
/// the model is instructed to emit (`preparation` / `main` / `finish`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Preparation,
    Main,
    Finish,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Preparation, Phase::Main, Phase::Finish];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Preparation => "preparation",
            Phase::Main => "main",
            Phase::Finish => "finish",
        }
    }

    /// Czech label used in prompt text and notifications.
    pub fn label_cs(&self) -> &'static str {
        match self {
            Phase::Preparation => "Přípravná část",
            Phase::Main => "Hlavní část",
            Phase::Finish => "Závěrečná část",
        }
    }
}

/// One concrete exercise inside a lesson phase.
///
/// Model output often omits the `phase` tag despite instructions; the response
/// processor normalizes it from the containing collection so downstream
/// consumers can rely on it being populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Minutes.
    pub time: u32,
    #[serde(default)]
    pub phase: Option<Phase>,
}

/// Exactly three named collections of exercises, one per phase.
///
/// A lesson is complete only when all three are non-empty; partial results are
/// a valid intermediate state during phase-only regeneration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonExerciseData {
    #[serde(default)]
    pub preparation: Vec<ExerciseItem>,
    #[serde(default)]
    pub main: Vec<ExerciseItem>,
    #[serde(default)]
    pub finish: Vec<ExerciseItem>,
}

impl LessonExerciseData {
    pub fn phase(&self, phase: Phase) -> &[ExerciseItem] {
        match phase {
            Phase::Preparation => &self.preparation,
            Phase::Main => &self.main,
            Phase::Finish => &self.finish,
        }
    }

    pub fn phase_mut(&mut self, phase: Phase) -> &mut Vec<ExerciseItem> {
        match phase {
            Phase::Preparation => &mut self.preparation,
            Phase::Main => &mut self.main,
            Phase::Finish => &mut self.finish,
        }
    }

    pub fn is_complete(&self) -> bool {
        Phase::ALL.iter().all(|p| !self.phase(*p).is_empty())
    }

    /// Stamps every item with the phase of the collection it sits in.
    pub fn normalize_phases(&mut self) {
        for phase in Phase::ALL {
            for item in self.phase_mut(phase) {
                item.phase = Some(phase);
            }
        }
    }

    /// All exercise names across all phases, in encounter order.
    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        Phase::ALL
            .into_iter()
            .flat_map(|p| self.phase(p).iter())
            .map(|item| item.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, time: u32) -> ExerciseItem {
        ExerciseItem {
            name: name.to_string(),
            description: String::new(),
            time,
            phase: None,
        }
    }

    #[test]
    fn test_phase_wire_names() {
        assert_eq!(
            serde_json::to_string(&Phase::Preparation).unwrap(),
            "\"preparation\""
        );
        assert_eq!(serde_json::to_string(&Phase::Main).unwrap(), "\"main\"");
        assert_eq!(serde_json::to_string(&Phase::Finish).unwrap(), "\"finish\"");
    }

    #[test]
    fn test_is_complete_requires_all_three_phases() {
        let mut data = LessonExerciseData::default();
        assert!(!data.is_complete());

        data.preparation.push(item("Rozklus", 5));
        data.main.push(item("Přihrávky", 15));
        assert!(!data.is_complete());

        data.finish.push(item("Protažení", 5));
        assert!(data.is_complete());
    }

    #[test]
    fn test_normalize_phases_stamps_every_item() {
        let mut data = LessonExerciseData {
            preparation: vec![item("Rozklus", 5)],
            main: vec![item("Přihrávky", 15), item("Střelba", 10)],
            finish: vec![item("Protažení", 5)],
        };
        data.normalize_phases();

        assert_eq!(data.preparation[0].phase, Some(Phase::Preparation));
        assert!(data.main.iter().all(|i| i.phase == Some(Phase::Main)));
        assert_eq!(data.finish[0].phase, Some(Phase::Finish));
    }

    #[test]
    fn test_exercise_item_tolerates_missing_description_and_phase() {
        let json = r#"{"name": "Skoky přes švihadlo", "time": 8}"#;
        let parsed: ExerciseItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.name, "Skoky přes švihadlo");
        assert_eq!(parsed.time, 8);
        assert!(parsed.description.is_empty());
        assert!(parsed.phase.is_none());
    }
}
