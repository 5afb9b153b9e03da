//! Fragment table access: insert, upsert, listing, tag lookup, and cluster
//! reassignment.
//!
//! Every write keeps the `fragment_tags` membership index in step with the
//! `tags` column.

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

use super::types::Fragment;
use super::{decode_list, encode_list};

const FRAGMENT_COLUMNS: &str = "id, text, created_at, star, tags, cluster_id, rel";

fn fragment_from_row(row: &Row<'_>) -> rusqlite::Result<Fragment> {
    let tags: String = row.get(4)?;
    let rel: String = row.get(6)?;
    Ok(Fragment {
        id: row.get(0)?,
        text: row.get(1)?,
        created_at: row.get(2)?,
        star: row.get(3)?,
        tags: decode_list(&tags, 4)?,
        cluster_id: row.get(5)?,
        rel: decode_list(&rel, 6)?,
    })
}

/// Insert-or-replace a fragment by id and refresh its tag index rows.
///
/// Uses `ON CONFLICT DO UPDATE` rather than `INSERT OR REPLACE` so the row keeps
/// its rowid and the tag rows are not cascade-deleted mid-write.
pub fn upsert_fragment(conn: &Connection, fragment: &Fragment) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO fragments (id, text, created_at, star, tags, cluster_id, rel) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         ON CONFLICT(id) DO UPDATE SET text = excluded.text, created_at = excluded.created_at, \
         star = excluded.star, tags = excluded.tags, cluster_id = excluded.cluster_id, rel = excluded.rel",
        params![
            fragment.id,
            fragment.text,
            fragment.created_at,
            fragment.star,
            encode_list(&fragment.tags),
            fragment.cluster_id,
            encode_list(&fragment.rel),
        ],
    )?;

    conn.execute(
        "DELETE FROM fragment_tags WHERE fragment_id = ?1",
        params![fragment.id],
    )?;
    let mut stmt =
        conn.prepare_cached("INSERT OR IGNORE INTO fragment_tags (fragment_id, tag) VALUES (?1, ?2)")?;
    for tag in &fragment.tags {
        stmt.execute(params![fragment.id, tag])?;
    }

    Ok(())
}

/// Insert a new fragment in its own transaction.
pub fn insert_fragment(conn: &mut Connection, fragment: &Fragment) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    upsert_fragment(&tx, fragment)?;
    tx.commit()
}

/// Fetch one fragment by id.
pub fn get_fragment(conn: &Connection, id: &str) -> rusqlite::Result<Option<Fragment>> {
    conn.query_row(
        &format!("SELECT {FRAGMENT_COLUMNS} FROM fragments WHERE id = ?1"),
        params![id],
        fragment_from_row,
    )
    .optional()
}

/// All fragments, oldest first.
pub fn list_fragments(conn: &Connection) -> rusqlite::Result<Vec<Fragment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FRAGMENT_COLUMNS} FROM fragments ORDER BY created_at, rowid"
    ))?;
    let rows = stmt.query_map([], fragment_from_row)?;
    rows.collect()
}

/// The `limit` newest fragments, newest first.
pub fn recent_fragments(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<Fragment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FRAGMENT_COLUMNS} FROM fragments ORDER BY created_at DESC, rowid DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit as i64], fragment_from_row)?;
    rows.collect()
}

/// Fragments carrying `tag`, oldest first. Goes through the tag index.
pub fn fragments_with_tag(conn: &Connection, tag: &str) -> rusqlite::Result<Vec<Fragment>> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.text, f.created_at, f.star, f.tags, f.cluster_id, f.rel \
         FROM fragments f JOIN fragment_tags t ON t.fragment_id = f.id \
         WHERE t.tag = ?1 ORDER BY f.created_at, f.rowid",
    )?;
    let rows = stmt.query_map(params![tag], fragment_from_row)?;
    rows.collect()
}

/// Distinct tags in use, alphabetically.
pub fn all_tags(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT tag FROM fragment_tags ORDER BY tag")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect()
}

pub fn count_fragments(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM fragments", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Point every fragment at the cluster listed for it in `assignments`, clearing
/// the reference for fragments not listed. Returns how many fragments ended up
/// assigned.
pub fn assign_clusters(
    conn: &Connection,
    assignments: &HashMap<String, String>,
) -> rusqlite::Result<usize> {
    conn.execute("UPDATE fragments SET cluster_id = NULL", [])?;

    let mut stmt = conn.prepare_cached("UPDATE fragments SET cluster_id = ?1 WHERE id = ?2")?;
    let mut assigned = 0;
    for (fragment_id, cluster_id) in assignments {
        assigned += stmt.execute(params![cluster_id, fragment_id])?;
    }
    Ok(assigned)
}
