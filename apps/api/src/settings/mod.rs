//! Settings Store — admin-configured AI and generation-tuning settings.
//!
//! Both tables are true singletons pinned to `id = 1` and written only via
//! upsert, so there is never more than one row to read back.

pub mod handlers;

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::settings::{AiSettingsRow, GenerationSettings};

/// Reads the AI settings row. `None` means the admin never configured AI.
pub async fn load_ai_settings(pool: &PgPool) -> Result<Option<AiSettingsRow>> {
    Ok(
        sqlx::query_as::<_, AiSettingsRow>("SELECT * FROM ai_settings WHERE id = 1")
            .fetch_optional(pool)
            .await?,
    )
}

/// Input for the AI settings upsert; mirrors the admin settings screen.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AiSettingsUpdate {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: i32,
    pub system_prompt: Option<String>,
    pub enabled: bool,
}

pub async fn upsert_ai_settings(pool: &PgPool, update: &AiSettingsUpdate) -> Result<AiSettingsRow> {
    let row = sqlx::query_as::<_, AiSettingsRow>(
        r#"
        INSERT INTO ai_settings
            (id, provider, api_key, model, temperature, max_tokens, system_prompt, enabled, updated_at)
        VALUES (1, $1, $2, $3, $4, $5, $6, $7, NOW())
        ON CONFLICT (id) DO UPDATE SET
            provider = EXCLUDED.provider,
            api_key = EXCLUDED.api_key,
            model = EXCLUDED.model,
            temperature = EXCLUDED.temperature,
            max_tokens = EXCLUDED.max_tokens,
            system_prompt = EXCLUDED.system_prompt,
            enabled = EXCLUDED.enabled,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&update.provider)
    .bind(&update.api_key)
    .bind(&update.model)
    .bind(update.temperature)
    .bind(update.max_tokens)
    .bind(&update.system_prompt)
    .bind(update.enabled)
    .fetch_one(pool)
    .await?;

    info!(provider = %row.provider, enabled = row.enabled, "AI settings updated");
    Ok(row)
}

/// Reads the generation-tuning settings, falling back to the hard-coded
/// defaults when the singleton row is absent.
pub async fn load_generation_settings(pool: &PgPool) -> Result<GenerationSettings> {
    let row: Option<(i32, i32, f64, i32, i32, i32, i32, i32, i32)> = sqlx::query_as(
        r#"
        SELECT max_repetitions, min_week_gap, progression_coefficient,
               min_exercises_preparation, max_exercises_preparation,
               min_exercises_main, max_exercises_main,
               min_exercises_finish, max_exercises_finish
        FROM generation_settings WHERE id = 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((
            max_repetitions,
            min_week_gap,
            progression_coefficient,
            min_prep,
            max_prep,
            min_main,
            max_main,
            min_finish,
            max_finish,
        )) => GenerationSettings {
            max_repetitions,
            min_week_gap,
            progression_coefficient,
            min_exercises_preparation: min_prep,
            max_exercises_preparation: max_prep,
            min_exercises_main: min_main,
            max_exercises_main: max_main,
            min_exercises_finish: min_finish,
            max_exercises_finish: max_finish,
        },
        None => GenerationSettings::default(),
    })
}

pub async fn upsert_generation_settings(
    pool: &PgPool,
    settings: &GenerationSettings,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO generation_settings
            (id, max_repetitions, min_week_gap, progression_coefficient,
             min_exercises_preparation, max_exercises_preparation,
             min_exercises_main, max_exercises_main,
             min_exercises_finish, max_exercises_finish, updated_at)
        VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
        ON CONFLICT (id) DO UPDATE SET
            max_repetitions = EXCLUDED.max_repetitions,
            min_week_gap = EXCLUDED.min_week_gap,
            progression_coefficient = EXCLUDED.progression_coefficient,
            min_exercises_preparation = EXCLUDED.min_exercises_preparation,
            max_exercises_preparation = EXCLUDED.max_exercises_preparation,
            min_exercises_main = EXCLUDED.min_exercises_main,
            max_exercises_main = EXCLUDED.max_exercises_main,
            min_exercises_finish = EXCLUDED.min_exercises_finish,
            max_exercises_finish = EXCLUDED.max_exercises_finish,
            updated_at = NOW()
        "#,
    )
    .bind(settings.max_repetitions)
    .bind(settings.min_week_gap)
    .bind(settings.progression_coefficient)
    .bind(settings.min_exercises_preparation)
    .bind(settings.max_exercises_preparation)
    .bind(settings.min_exercises_main)
    .bind(settings.max_exercises_main)
    .bind(settings.min_exercises_finish)
    .bind(settings.max_exercises_finish)
    .execute(pool)
    .await?;

    info!("generation settings updated");
    Ok(())
}
