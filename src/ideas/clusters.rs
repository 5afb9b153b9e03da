//! Cluster table access. The table is always replaced as a whole.

use rusqlite::{params, Connection, Row};

use super::types::Cluster;
use super::{decode_list, encode_list};

fn cluster_from_row(row: &Row<'_>) -> rusqlite::Result<Cluster> {
    let tag_hints: String = row.get(2)?;
    let fragment_ids: String = row.get(3)?;
    Ok(Cluster {
        id: row.get(0)?,
        label: row.get(1)?,
        tag_hints: decode_list(&tag_hints, 2)?,
        fragment_ids: decode_list(&fragment_ids, 3)?,
        score: row.get(4)?,
    })
}

/// Stored clusters in the order the model returned them.
pub fn list_clusters(conn: &Connection) -> rusqlite::Result<Vec<Cluster>> {
    let mut stmt = conn.prepare(
        "SELECT id, label, tag_hints, fragment_ids, score FROM clusters ORDER BY position, id",
    )?;
    let rows = stmt.query_map([], cluster_from_row)?;
    rows.collect()
}

/// Clusters whose label matches exactly.
pub fn clusters_by_label(conn: &Connection, label: &str) -> rusqlite::Result<Vec<Cluster>> {
    let mut stmt = conn.prepare(
        "SELECT id, label, tag_hints, fragment_ids, score FROM clusters WHERE label = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![label], cluster_from_row)?;
    rows.collect()
}

pub fn count_clusters(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM clusters", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Drop every stored cluster and write `clusters` in their place.
///
/// Callers run this inside the same transaction as the fragment reassignment.
pub fn replace_clusters(conn: &Connection, clusters: &[Cluster]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM clusters", [])?;

    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO clusters (id, label, tag_hints, fragment_ids, score, position) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (position, cluster) in clusters.iter().enumerate() {
        stmt.execute(params![
            cluster.id,
            cluster.label,
            encode_list(&cluster.tag_hints),
            encode_list(&cluster.fragment_ids),
            cluster.score,
            position as i64,
        ])?;
    }
    Ok(())
}
