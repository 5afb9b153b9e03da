use rusqlite::Connection;
use serde::Serialize;

use super::{clusters, fragments, insight};

/// Headline numbers for `stats` and the printable report.
#[derive(Debug, Serialize, PartialEq)]
pub struct IdeaStats {
    pub total_fragments: u64,
    /// Distinct cluster ids referenced by fragments.
    pub clusters_in_use: u64,
    /// Distinct tags across all fragments.
    pub tag_diversity: u64,
    pub stored_clusters: u64,
    /// Fragment ids folded into the cached insight (may include deleted ones).
    pub insight_coverage: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight_updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_fragment: Option<String>,
}

/// Compute store statistics.
pub fn idea_stats(conn: &Connection) -> rusqlite::Result<IdeaStats> {
    let total_fragments = fragments::count_fragments(conn)?;
    let clusters_in_use: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT cluster_id) FROM fragments WHERE cluster_id IS NOT NULL AND cluster_id != ''",
        [],
        |row| row.get(0),
    )?;
    let tag_diversity = fragments::all_tags(conn)?.len() as u64;
    let stored_clusters = clusters::count_clusters(conn)?;

    let cached = insight::load_insight(conn)?;
    let (insight_coverage, insight_updated_at) = match cached {
        Some(c) => (c.member_ids.len() as u64, Some(c.updated_at)),
        None => (0, None),
    };

    let (oldest_fragment, newest_fragment) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM fragments",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(IdeaStats {
        total_fragments,
        clusters_in_use: clusters_in_use as u64,
        tag_diversity,
        stored_clusters,
        insight_coverage,
        insight_updated_at,
        oldest_fragment,
        newest_fragment,
    })
}
