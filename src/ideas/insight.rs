//! Singleton insight cache persistence.

use rusqlite::{params, Connection, OptionalExtension};

use super::types::{CachedInsight, INSIGHT_CACHE_ID};
use super::{decode_list, encode_list};

/// Load the cached insight, if one has been generated.
pub fn load_insight(conn: &Connection) -> rusqlite::Result<Option<CachedInsight>> {
    conn.query_row(
        "SELECT summary, next_steps, titles, member_ids, updated_at FROM insight_cache WHERE id = ?1",
        params![INSIGHT_CACHE_ID],
        |row| {
            let next_steps: String = row.get(1)?;
            let titles: String = row.get(2)?;
            let member_ids: String = row.get(3)?;
            Ok(CachedInsight {
                summary: row.get(0)?,
                next_steps: decode_list(&next_steps, 1)?,
                titles: decode_list(&titles, 2)?,
                member_ids: decode_list(&member_ids, 3)?,
                updated_at: row.get(4)?,
            })
        },
    )
    .optional()
}

/// Overwrite the singleton with `insight`.
pub fn save_insight(conn: &Connection, insight: &CachedInsight) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO insight_cache (id, summary, next_steps, titles, member_ids, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            INSIGHT_CACHE_ID,
            insight.summary,
            encode_list(&insight.next_steps),
            encode_list(&insight.titles),
            encode_list(&insight.member_ids),
            insight.updated_at,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn insight(summary: &str, members: &[&str]) -> CachedInsight {
        CachedInsight {
            summary: summary.into(),
            next_steps: vec!["step".into()],
            titles: vec!["title".into()],
            member_ids: members.iter().map(|m| m.to_string()).collect(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn empty_cache_loads_none() {
        let conn = db::open_memory_database().unwrap();
        assert!(load_insight(&conn).unwrap().is_none());
    }

    #[test]
    fn save_overwrites_singleton() {
        let conn = db::open_memory_database().unwrap();
        save_insight(&conn, &insight("first", &["1"])).unwrap();
        save_insight(&conn, &insight("second", &["1", "2"])).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM insight_cache", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);

        let loaded = load_insight(&conn).unwrap().unwrap();
        assert_eq!(loaded.summary, "second");
        assert_eq!(loaded.member_ids, ["1", "2"]);
    }
}
