#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Supported chat-completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAi,
    Groq,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Groq => "groq",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "openai" => Some(AiProvider::OpenAi),
            "groq" => Some(AiProvider::Groq),
            _ => None,
        }
    }
}

/// Admin-configured AI settings. A true singleton: one row pinned to `id = 1`,
/// written only via upsert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiSettingsRow {
    pub id: i16,
    /// Stored as plain text; see [`AiProvider::parse`].
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: i32,
    pub system_prompt: Option<String>,
    pub enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl AiSettingsRow {
    pub fn provider(&self) -> Option<AiProvider> {
        AiProvider::parse(&self.provider)
    }
}

/// Numeric tuning knobs for generation. Singleton row `id = 1`; the defaults
/// below apply when no row exists yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// How many times one exercise may appear across the whole plan.
    pub max_repetitions: i32,
    /// Minimum number of weeks between two uses of the same exercise.
    pub min_week_gap: i32,
    /// Difficulty ramp per lesson, communicated to the model as prose.
    pub progression_coefficient: f64,
    pub min_exercises_preparation: i32,
    pub max_exercises_preparation: i32,
    pub min_exercises_main: i32,
    pub max_exercises_main: i32,
    pub min_exercises_finish: i32,
    pub max_exercises_finish: i32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_repetitions: 3,
            min_week_gap: 2,
            progression_coefficient: 0.1,
            min_exercises_preparation: 2,
            max_exercises_preparation: 4,
            min_exercises_main: 3,
            max_exercises_main: 6,
            min_exercises_finish: 2,
            max_exercises_finish: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_wire_names() {
        assert_eq!(
            serde_json::to_string(&AiProvider::OpenAi).unwrap(),
            "\"openai\""
        );
        assert_eq!(serde_json::to_string(&AiProvider::Groq).unwrap(), "\"groq\"");
        let parsed: AiProvider = serde_json::from_str("\"groq\"").unwrap();
        assert_eq!(parsed, AiProvider::Groq);
    }

    #[test]
    fn test_generation_settings_defaults_are_sane() {
        let s = GenerationSettings::default();
        assert!(s.max_repetitions > 0);
        assert!(s.min_week_gap > 0);
        assert!(s.min_exercises_preparation <= s.max_exercises_preparation);
        assert!(s.min_exercises_main <= s.max_exercises_main);
        assert!(s.min_exercises_finish <= s.max_exercises_finish);
    }
}
