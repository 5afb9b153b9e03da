//! Bulk JSON export and validated import of the fragment table.
//!
//! The interchange document is a bare JSON array of [`Fragment`] records.
//! Import validates each record on its own: bad records are skipped and
//! reported, good ones are upserted by id inside a single transaction.

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;

use super::fragments;
use super::types::{Fragment, Priority};
use crate::error::{IdeaError, Result};

/// One record the importer refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    /// Position in the uploaded array.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of an import.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    /// Records written (new or replacing an existing id).
    pub imported: usize,
    /// Of `imported`, how many replaced an existing fragment.
    pub replaced: usize,
    pub rejected: Vec<RejectedRecord>,
}

/// Every fragment, oldest first, as a pretty-printed JSON array.
pub fn export_json(conn: &Connection) -> Result<String> {
    let all = fragments::list_fragments(conn)?;
    Ok(serde_json::to_string_pretty(&all)?)
}

/// Parse an import document into validated fragments and rejections.
///
/// Fails with [`IdeaError::ImportParseFailure`] only when the document as a whole
/// is not a JSON array.
pub fn parse_import(json: &str) -> Result<(Vec<Fragment>, Vec<RejectedRecord>)> {
    let doc: Value =
        serde_json::from_str(json).map_err(|e| IdeaError::ImportParseFailure(e.to_string()))?;
    let Value::Array(records) = doc else {
        return Err(IdeaError::ImportParseFailure(
            "expected a JSON array of fragment records".into(),
        ));
    };

    let mut valid = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match validate_record(record) {
            Ok(fragment) => valid.push(fragment),
            Err(reason) => rejected.push(RejectedRecord {
                index,
                id: record.get("id").and_then(Value::as_str).map(String::from),
                reason,
            }),
        }
    }
    Ok((valid, rejected))
}

/// Check one record's fields and build a [`Fragment`] from it.
pub fn validate_record(record: &Value) -> std::result::Result<Fragment, String> {
    let obj = record.as_object().ok_or("record is not an object")?;

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) => return Err("id is empty".into()),
        Some(_) => return Err("id is not a string".into()),
        None => return Err("missing id".into()),
    };

    let text = match obj.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err("text is not a string".into()),
        None => return Err("missing text".into()),
    };

    let created_at = match obj.get("createdAt") {
        // stored as UTC so text order is time order
        Some(Value::String(s)) => chrono::DateTime::parse_from_rfc3339(s)
            .map_err(|e| format!("createdAt is not an RFC 3339 timestamp: {e}"))?
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        Some(_) => return Err("createdAt is not a string".into()),
        None => return Err("missing createdAt".into()),
    };

    let star = match obj.get("star") {
        None | Some(Value::Null) => 0,
        Some(v) => match v.as_u64() {
            Some(n) if n <= u64::from(Priority::MAX_STAR) => n as u8,
            _ => return Err(format!("star must be an integer 0..={}", Priority::MAX_STAR)),
        },
    };

    let tags = string_list(obj.get("tags"), "tags")?;
    let rel = string_list(obj.get("rel"), "rel")?;

    let cluster_id = match obj.get("clusterId") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err("clusterId is not a string".into()),
    };

    Ok(Fragment {
        id,
        text,
        created_at,
        star,
        tags,
        cluster_id,
        rel,
    })
}

fn string_list(value: Option<&Value>, field: &str) -> std::result::Result<Vec<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| format!("{field} must contain only strings"))
            })
            .collect(),
        Some(_) => Err(format!("{field} is not an array")),
    }
}

/// Validate `json` and upsert every valid record in one transaction.
pub fn import_fragments(conn: &mut Connection, json: &str) -> Result<ImportReport> {
    let (valid, rejected) = parse_import(json)?;

    let tx = conn.transaction()?;
    let mut replaced = 0;
    for fragment in &valid {
        if fragments::get_fragment(&tx, &fragment.id)?.is_some() {
            replaced += 1;
        }
        fragments::upsert_fragment(&tx, fragment)?;
    }
    tx.commit()?;

    for rejection in &rejected {
        tracing::warn!(
            index = rejection.index,
            id = rejection.id.as_deref().unwrap_or("-"),
            reason = %rejection.reason,
            "skipping invalid import record"
        );
    }
    tracing::info!(
        imported = valid.len(),
        replaced,
        rejected = rejected.len(),
        "import finished"
    );

    Ok(ImportReport {
        imported: valid.len(),
        replaced,
        rejected,
    })
}
