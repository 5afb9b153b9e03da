//! SQL DDL for the base IdeaCloud tables.
//!
//! Defines `fragments`, the `fragment_tags` membership index, and `schema_meta`.
//! Tables added later (clusters, insight cache) arrive through
//! [`migrations`](super::migrations). All DDL uses `IF NOT EXISTS` for idempotent
//! initialization.

use rusqlite::Connection;

/// Schema version 1: fragments and their tag index.
const SCHEMA_SQL: &str = r#"
-- Captured idea fragments
CREATE TABLE IF NOT EXISTS fragments (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL,
    star INTEGER NOT NULL DEFAULT 0,
    tags TEXT NOT NULL DEFAULT '[]',
    cluster_id TEXT,
    rel TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_fragments_created ON fragments(created_at);
CREATE INDEX IF NOT EXISTS idx_fragments_cluster ON fragments(cluster_id);

-- Multi-entry tag index (one row per fragment/tag pair)
CREATE TABLE IF NOT EXISTS fragment_tags (
    fragment_id TEXT NOT NULL REFERENCES fragments(id) ON DELETE CASCADE,
    tag TEXT NOT NULL,
    PRIMARY KEY (fragment_id, tag)
);

CREATE INDEX IF NOT EXISTS idx_fragment_tags_tag ON fragment_tags(tag);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize the base tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
