#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::lesson::LessonExerciseData;

/// Plan metadata as created by the wizard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanRow {
    pub id: Uuid,
    pub school_name: String,
    pub grade: i16,
    pub construct: String,
    pub environment: String,
    pub equipment: Vec<String>,
    pub preparation_time: i32,
    pub main_time: i32,
    pub finish_time: i32,
    pub preparation_role: String,
    pub main_role: String,
    pub finish_role: String,
    pub weeks_count: i32,
    pub lessons_per_week: i32,
    pub created_at: DateTime<Utc>,
}

/// One lesson slot of a plan, keyed by `(plan_id, week_number, lesson_number)`.
/// `exercises` holds the LessonExerciseData JSON; `system_prompt`/`user_prompt`
/// are the prompt-debug text actually sent; `error_message` captures a failed
/// auto-generation so the UI can offer an inline retry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanLessonRow {
    pub plan_id: Uuid,
    pub week_number: i32,
    pub lesson_number: i32,
    pub exercises: Option<Value>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PlanLessonRow {
    /// Parses the stored exercise JSON. Malformed or absent payloads yield
    /// `None`, which callers treat the same as an empty slot.
    pub fn lesson_data(&self) -> Option<LessonExerciseData> {
        let value = self.exercises.clone()?;
        serde_json::from_value(value).ok()
    }

    /// A slot counts as filled only when its payload passes the same
    /// three-phase presence check the response processor applies.
    pub fn has_complete_exercises(&self) -> bool {
        self.lesson_data().map(|d| d.is_complete()).unwrap_or(false)
    }
}

/// A grounding chunk from an uploaded document. Read-only to this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KnowledgeChunkRow {
    pub id: Uuid,
    pub content: String,
    pub source_file: String,
    pub activity_name: Option<String>,
    pub exercise_phase: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog activity consulted by the `IdReferences` bulk lookup.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub phase: Option<String>,
}
