//! Activity Extractor — resolves the flat list of selected activity names
//! from the explicit `ActivitySource` union on the request.
//!
//! Resolution order: free-text tokens first, then explicit per-phase picks,
//! and only if both yield nothing are raw catalog IDs looked up in one bulk
//! query. Zero resolved activities is not an error; callers treat an empty
//! list as "generate without specific grounding".

use anyhow::Result;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::request::ActivitySource;
use crate::models::rows::ActivityRow;

/// Inline (non-DB) part of the resolution: free-text and explicit-list names
/// in priority order plus any IDs held back for the catalog lookup.
pub fn resolve_inline(sources: &[ActivitySource]) -> (Vec<String>, Vec<Uuid>) {
    let mut names: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let mut ids: Vec<Uuid> = Vec::new();

    let mut push = |name: &str, names: &mut Vec<String>, seen: &mut Vec<String>| {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return;
        }
        let key = trimmed.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            names.push(trimmed.to_string());
        }
    };

    for source in sources {
        if let ActivitySource::FreeText { text } = source {
            for token in text.split(',') {
                push(token, &mut names, &mut seen);
            }
        }
    }

    for source in sources {
        if let ActivitySource::ExplicitList { activities } = source {
            for activity in activities {
                push(&activity.name, &mut names, &mut seen);
            }
        }
    }

    for source in sources {
        if let ActivitySource::IdReferences { ids: refs } = source {
            for id in refs {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }
    }

    (names, ids)
}

/// Full resolution: inline sources first; the ID fallback fires only when
/// nothing else resolved, with a single bulk lookup against the catalog.
pub async fn extract_activities(pool: &PgPool, sources: &[ActivitySource]) -> Result<Vec<String>> {
    let (mut names, ids) = resolve_inline(sources);

    if names.is_empty() && !ids.is_empty() {
        let rows = sqlx::query_as::<_, ActivityRow>(
            "SELECT * FROM activities WHERE id = ANY($1) ORDER BY name",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut seen: Vec<String> = Vec::new();
        for row in rows {
            let key = row.name.to_lowercase();
            if !seen.contains(&key) {
                seen.push(key);
                names.push(row.name);
            }
        }
    }

    debug!(count = names.len(), "resolved selected activities");
    Ok(names)
}
