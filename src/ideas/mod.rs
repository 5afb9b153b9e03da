pub mod clusters;
pub mod fragments;
pub mod insight;
pub mod report;
pub mod stats;
pub mod transfer;
pub mod types;

use rusqlite::types::Type;

/// Encode a string list for a JSON text column.
pub(crate) fn encode_list(values: &[String]) -> String {
    serde_json::Value::from(values.to_vec()).to_string()
}

/// Decode a JSON text column into a string list, surfacing bad data as a
/// conversion error on column `idx`.
pub(crate) fn decode_list(raw: &str, idx: usize) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
