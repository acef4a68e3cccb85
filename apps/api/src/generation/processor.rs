//! Response Processor — turns raw model output into a `LessonExerciseData`.
//!
//! The model is instructed to emit bare JSON, but in practice wraps it in
//! markdown fences or surrounds it with prose. Processing is defensive:
//! strip fence artifacts, slice to the outer JSON object, parse, and verify
//! the three phase keys exist. Nothing beyond key presence is validated;
//! item shape is trusted per the prompt contract.

use thiserror::Error;
use tracing::warn;

use crate::models::lesson::{LessonExerciseData, Phase};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("model response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model response is missing the '{0}' phase")]
    MissingPhase(&'static str),
}

/// Cleans and parses a raw completion. Errors never escape as panics; the
/// caller substitutes the fallback plan on failure.
pub fn process_response(raw: &str) -> Result<LessonExerciseData, ProcessError> {
    let cleaned = clean_raw_text(raw);
    let sliced = slice_to_json_object(&cleaned);

    let value: serde_json::Value = serde_json::from_str(sliced).inspect_err(|e| {
        warn!(error = %e, raw_chars = raw.len(), "failed to parse model response");
        warn!(cleaned = %sliced.chars().take(400).collect::<String>(), "cleaned response prefix");
    })?;

    for phase in Phase::ALL {
        if value.get(phase.as_str()).is_none() {
            warn!(phase = phase.as_str(), "model response missing phase key");
            return Err(ProcessError::MissingPhase(phase.as_str()));
        }
    }

    let mut data: LessonExerciseData = serde_json::from_value(value)?;
    data.normalize_phases();
    Ok(data)
}

/// Strips markdown code fences (with or without a language tag) and any stray
/// backtick runs anywhere in the text.
fn clean_raw_text(raw: &str) -> String {
    raw.trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Slices to the substring between the first `{` and the last `}`, guarding
/// against leading or trailing prose. Returns the input unchanged when no
/// such pair exists.
fn slice_to_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lesson::ExerciseItem;

    fn valid_lesson() -> LessonExerciseData {
        let item = |name: &str, time: u32, phase: Phase| ExerciseItem {
            name: name.to_string(),
            description: format!("Podrobný popis cviku {name}."),
            time,
            phase: Some(phase),
        };
        LessonExerciseData {
            preparation: vec![item("Rozklus", 5, Phase::Preparation)],
            main: vec![
                item("Přihrávky ve dvojicích", 15, Phase::Main),
                item("Průpravná hra", 10, Phase::Main),
            ],
            finish: vec![item("Protažení", 5, Phase::Finish)],
        }
    }

    #[test]
    fn test_round_trip_through_fences_and_prose() {
        let lesson = valid_lesson();
        let json = serde_json::to_string_pretty(&lesson).unwrap();
        let raw = format!("Zde je navržená hodina:\n```json\n{json}\n```\nHodně štěstí!");

        let recovered = process_response(&raw).unwrap();
        assert_eq!(recovered, lesson);
    }

    #[test]
    fn test_bare_json_passes() {
        let lesson = valid_lesson();
        let json = serde_json::to_string(&lesson).unwrap();
        assert_eq!(process_response(&json).unwrap(), lesson);
    }

    #[test]
    fn test_fence_without_language_tag() {
        let lesson = valid_lesson();
        let json = serde_json::to_string(&lesson).unwrap();
        let raw = format!("```\n{json}\n```");
        assert_eq!(process_response(&raw).unwrap(), lesson);
    }

    #[test]
    fn test_missing_phase_key_is_rejected() {
        let raw = r#"{"preparation": [], "main": []}"#;
        let err = process_response(raw).unwrap_err();
        assert!(matches!(err, ProcessError::MissingPhase("finish")));
    }

    #[test]
    fn test_invalid_json_is_rejected_without_panicking() {
        assert!(process_response("toto není JSON").is_err());
        assert!(process_response("{\"preparation\": [").is_err());
        assert!(process_response("").is_err());
    }

    #[test]
    fn test_phases_are_normalized_onto_items() {
        let raw = r#"{
            "preparation": [{"name": "Rozklus", "description": "x", "time": 5}],
            "main": [{"name": "Hra", "description": "x", "time": 20}],
            "finish": [{"name": "Protažení", "description": "x", "time": 5}]
        }"#;
        let data = process_response(raw).unwrap();
        assert_eq!(data.preparation[0].phase, Some(Phase::Preparation));
        assert_eq!(data.main[0].phase, Some(Phase::Main));
        assert_eq!(data.finish[0].phase, Some(Phase::Finish));
    }

    #[test]
    fn test_empty_phase_arrays_are_valid_partial_results() {
        let raw = r#"{"preparation": [], "main": [{"name": "Hra", "time": 20}], "finish": []}"#;
        let data = process_response(raw).unwrap();
        assert!(!data.is_complete());
        assert_eq!(data.main.len(), 1);
    }
}
