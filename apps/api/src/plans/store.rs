//! Persistence helpers for plans and their lesson slots.
//!
//! Lesson slots are written with a conditional upsert on the composite key
//! `(plan_id, week_number, lesson_number)`, so concurrent writes to one slot
//! resolve atomically at the store instead of racing across a read-then-write.

use anyhow::Result;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::generation::prompt_builder::BuiltPrompt;
use crate::models::lesson::LessonExerciseData;
use crate::models::request::PriorLesson;
use crate::models::rows::{PlanLessonRow, PlanRow};

/// Payload for creating a plan from the wizard.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanInput {
    pub school_name: String,
    pub grade: i16,
    pub construct: String,
    pub environment: String,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub preparation_time: i32,
    pub main_time: i32,
    pub finish_time: i32,
    pub preparation_role: String,
    pub main_role: String,
    pub finish_role: String,
    pub weeks_count: i32,
    pub lessons_per_week: i32,
}

pub async fn create_plan(pool: &PgPool, input: &CreatePlanInput) -> Result<PlanRow> {
    let row = sqlx::query_as::<_, PlanRow>(
        r#"
        INSERT INTO plans
            (id, school_name, grade, construct, environment, equipment,
             preparation_time, main_time, finish_time,
             preparation_role, main_role, finish_role,
             weeks_count, lessons_per_week)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&input.school_name)
    .bind(input.grade)
    .bind(&input.construct)
    .bind(&input.environment)
    .bind(&input.equipment)
    .bind(input.preparation_time)
    .bind(input.main_time)
    .bind(input.finish_time)
    .bind(&input.preparation_role)
    .bind(&input.main_role)
    .bind(&input.finish_role)
    .bind(input.weeks_count)
    .bind(input.lessons_per_week)
    .fetch_one(pool)
    .await?;

    info!(plan_id = %row.id, weeks = row.weeks_count, "plan created");
    Ok(row)
}

pub async fn get_plan(pool: &PgPool, plan_id: Uuid) -> Result<Option<PlanRow>> {
    Ok(
        sqlx::query_as::<_, PlanRow>("SELECT * FROM plans WHERE id = $1")
            .bind(plan_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Deletes a plan; lesson slots cascade at the store level.
pub async fn delete_plan(pool: &PgPool, plan_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = $1")
        .bind(plan_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// All persisted lesson slots of a plan, in plan order.
pub async fn load_plan_lessons(pool: &PgPool, plan_id: Uuid) -> Result<Vec<PlanLessonRow>> {
    Ok(sqlx::query_as::<_, PlanLessonRow>(
        r#"
        SELECT * FROM plan_lessons
        WHERE plan_id = $1
        ORDER BY week_number, lesson_number
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?)
}

/// Lesson slots strictly before the target slot, in plan order. Ordering by
/// slot position rather than write time means later lessons see every earlier
/// one even when generation happened out of linear order.
pub async fn load_lessons_before(
    pool: &PgPool,
    plan_id: Uuid,
    week_number: i32,
    lesson_number: i32,
) -> Result<Vec<PlanLessonRow>> {
    Ok(sqlx::query_as::<_, PlanLessonRow>(
        r#"
        SELECT * FROM plan_lessons
        WHERE plan_id = $1
          AND (week_number < $2 OR (week_number = $2 AND lesson_number < $3))
        ORDER BY week_number, lesson_number
        "#,
    )
    .bind(plan_id)
    .bind(week_number)
    .bind(lesson_number)
    .fetch_all(pool)
    .await?)
}

/// Upserts a generated lesson into its slot, clearing any captured error.
pub async fn upsert_lesson(
    pool: &PgPool,
    plan_id: Uuid,
    week_number: i32,
    lesson_number: i32,
    exercises: &LessonExerciseData,
    prompt: Option<&BuiltPrompt>,
) -> Result<()> {
    let exercises_json = serde_json::to_value(exercises)?;

    sqlx::query(
        r#"
        INSERT INTO plan_lessons
            (plan_id, week_number, lesson_number, exercises,
             system_prompt, user_prompt, error_message, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, NULL, NOW())
        ON CONFLICT (plan_id, week_number, lesson_number) DO UPDATE SET
            exercises = EXCLUDED.exercises,
            system_prompt = EXCLUDED.system_prompt,
            user_prompt = EXCLUDED.user_prompt,
            error_message = NULL,
            updated_at = NOW()
        "#,
    )
    .bind(plan_id)
    .bind(week_number)
    .bind(lesson_number)
    .bind(exercises_json)
    .bind(prompt.map(|p| p.system_prompt.as_str()))
    .bind(prompt.map(|p| p.user_prompt.as_str()))
    .execute(pool)
    .await?;

    info!(%plan_id, week_number, lesson_number, "lesson slot upserted");
    Ok(())
}

/// Captures a failed auto-generation into the slot record so the UI can
/// render an inline retry affordance instead of a thrown error.
pub async fn record_slot_error(
    pool: &PgPool,
    plan_id: Uuid,
    week_number: i32,
    lesson_number: i32,
    message: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO plan_lessons
            (plan_id, week_number, lesson_number, exercises,
             system_prompt, user_prompt, error_message, updated_at)
        VALUES ($1, $2, $3, NULL, NULL, NULL, $4, NOW())
        ON CONFLICT (plan_id, week_number, lesson_number) DO UPDATE SET
            error_message = EXCLUDED.error_message,
            updated_at = NOW()
        "#,
    )
    .bind(plan_id)
    .bind(week_number)
    .bind(lesson_number)
    .bind(message)
    .execute(pool)
    .await?;

    info!(%plan_id, week_number, lesson_number, "slot error recorded");
    Ok(())
}

/// Converts persisted slots into prior-lesson context entries. Slots with no
/// parseable exercise payload contribute nothing.
pub fn to_prior_lessons(rows: &[PlanLessonRow]) -> Vec<PriorLesson> {
    rows.iter()
        .filter_map(|row| {
            let exercises = row.lesson_data()?;
            Some(PriorLesson {
                week_number: row.week_number.max(0) as u32,
                lesson_number: row.lesson_number.max(0) as u32,
                exercises,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(week: i32, lesson: i32, exercises: Option<serde_json::Value>) -> PlanLessonRow {
        PlanLessonRow {
            plan_id: Uuid::new_v4(),
            week_number: week,
            lesson_number: lesson,
            exercises,
            system_prompt: None,
            user_prompt: None,
            error_message: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_prior_lessons_skips_unparseable_slots() {
        let rows = vec![
            row(
                1,
                1,
                Some(serde_json::json!({
                    "preparation": [{"name": "Rozklus", "time": 5}],
                    "main": [],
                    "finish": []
                })),
            ),
            row(1, 2, Some(serde_json::json!({"preparation": 42}))),
            row(2, 1, None),
        ];
        let prior = to_prior_lessons(&rows);
        assert_eq!(prior.len(), 1);
        assert_eq!(prior[0].week_number, 1);
        assert_eq!(prior[0].exercises.preparation[0].name, "Rozklus");
    }
}
