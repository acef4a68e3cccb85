//! Knowledge Base Reader — read-only access to uploaded document chunks.
//!
//! Chunks are created by the (out-of-scope) document upload flow and tagged
//! with an `exercise_phase` and an `activity_name`. The generation pipeline
//! only ever reads them; deletion is an independent admin action.

use anyhow::Result;
use sqlx::PgPool;
use tracing::debug;

use crate::models::lesson::Phase;
use crate::models::rows::KnowledgeChunkRow;

/// All chunks tagged for one phase. Phase isolation starts here: the query is
/// filtered on `exercise_phase`, so a chunk can never leak into another
/// phase's context block.
#[derive(Debug, Clone)]
pub struct PhaseKnowledge {
    pub phase: Phase,
    pub chunks: Vec<KnowledgeChunkRow>,
}

/// Loads the knowledge chunks for a single phase.
pub async fn load_chunks_for_phase(pool: &PgPool, phase: Phase) -> Result<Vec<KnowledgeChunkRow>> {
    let chunks = sqlx::query_as::<_, KnowledgeChunkRow>(
        "SELECT * FROM knowledge_chunks WHERE exercise_phase = $1 ORDER BY created_at",
    )
    .bind(phase.as_str())
    .fetch_all(pool)
    .await?;

    debug!(phase = phase.as_str(), count = chunks.len(), "loaded knowledge chunks");
    Ok(chunks)
}

/// Loads chunk sets for all three phases. The queries are independent and
/// read-only; they run sequentially.
pub async fn load_phase_knowledge(pool: &PgPool) -> Result<Vec<PhaseKnowledge>> {
    let mut sections = Vec::with_capacity(3);
    for phase in Phase::ALL {
        let chunks = load_chunks_for_phase(pool, phase).await?;
        sections.push(PhaseKnowledge { phase, chunks });
    }
    Ok(sections)
}

/// Case-insensitive substring match in either direction. "Míčové hry" matches
/// the selected activity "míč" and vice versa.
pub fn fuzzy_match(chunk_activity: &str, selected: &str) -> bool {
    let a = chunk_activity.to_lowercase();
    let b = selected.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}
