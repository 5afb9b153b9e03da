//! Typed model replies with validating constructors.
//!
//! Each expected reply shape has a `from_value` constructor that normalizes what
//! it can (string coercion, default ids) and fails with
//! [`IdeaError::ResponseShapeInvalid`] on anything it cannot.

use serde::Serialize;
use serde_json::Value;

use crate::error::{IdeaError, Result};

/// Tags proposed for a single fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagResult {
    pub tags: Vec<String>,
    /// Advisory, clamped to `[0, 1]`.
    pub confidence: f64,
}

impl TagResult {
    /// Requires `tags: string[]` and `confidence: number`. Tags are trimmed,
    /// de-duplicated, and cut to `max_tags`.
    pub fn from_value(value: &Value, max_tags: usize) -> Result<Self> {
        let raw_tags = value
            .get("tags")
            .and_then(Value::as_array)
            .ok_or_else(|| shape("tag result has no `tags` array"))?;

        let mut tags: Vec<String> = Vec::new();
        for raw in raw_tags {
            let tag = raw
                .as_str()
                .ok_or_else(|| shape("tag result `tags` contains a non-string"))?
                .trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        tags.truncate(max_tags);

        let confidence = value
            .get("confidence")
            .and_then(Value::as_f64)
            .ok_or_else(|| shape("tag result has no numeric `confidence`"))?;

        Ok(Self {
            tags,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

/// One cluster as returned by the model, after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterDraft {
    pub id: String,
    pub label: String,
    pub member_ids: Vec<String>,
    pub keywords: Vec<String>,
}

/// The full cluster list of one recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSet {
    pub clusters: Vec<ClusterDraft>,
}

impl ClusterSet {
    /// Accepts a bare array or `{"clusters": [...]}`. Missing ids and labels get
    /// positional defaults; entries that are not objects are dropped.
    pub fn from_value(value: &Value) -> Result<Self> {
        let entries = match value {
            Value::Array(items) => items,
            Value::Object(map) => map
                .get("clusters")
                .and_then(Value::as_array)
                .ok_or_else(|| shape("cluster result has no `clusters` array"))?,
            _ => return Err(shape("cluster result is neither an array nor an object")),
        };

        let clusters = entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let obj = entry.as_object()?;
                let n = i + 1;
                Some(ClusterDraft {
                    id: obj
                        .get("id")
                        .and_then(scalar_to_string)
                        .unwrap_or_else(|| format!("cluster-{n}")),
                    label: obj
                        .get("label")
                        .and_then(scalar_to_string)
                        .unwrap_or_else(|| format!("Cluster {n}")),
                    member_ids: string_items(obj.get("memberIds")),
                    keywords: string_items(obj.get("keywords")),
                })
            })
            .collect();

        Ok(Self { clusters })
    }
}

/// Summary, next steps, and title ideas for a batch of fragments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightDraft {
    pub summary: String,
    pub next_steps: Vec<String>,
    pub titles: Vec<String>,
}

impl InsightDraft {
    /// Lenient per field, but at least one of the three must carry content.
    pub fn from_value(value: &Value) -> Result<Self> {
        let summary = value
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let next_steps = string_items(value.get("next_steps"));
        let titles = string_items(value.get("titles"));

        if summary.is_empty() && next_steps.is_empty() && titles.is_empty() {
            return Err(shape("insight result has no summary, next_steps, or titles"));
        }

        Ok(Self {
            summary,
            next_steps,
            titles,
        })
    }
}

fn shape(msg: &str) -> IdeaError {
    IdeaError::ResponseShapeInvalid(msg.to_string())
}

/// Non-empty strings, numbers, and booleans become strings; everything else is absent.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(scalar_to_string).collect())
        .unwrap_or_default()
}

/// Strip a surrounding Markdown code fence, if the model added one anyway.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string ("json") on the opening line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_result_is_trimmed_and_capped() {
        let result = TagResult::from_value(
            &json!({"tags": [" travel ", "travel", "", "food", "music"], "confidence": 1.7}),
            2,
        )
        .unwrap();
        assert_eq!(result.tags, ["travel", "food"]);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn tag_result_requires_both_fields() {
        assert!(matches!(
            TagResult::from_value(&json!({"confidence": 0.5}), 2),
            Err(IdeaError::ResponseShapeInvalid(_))
        ));
        assert!(matches!(
            TagResult::from_value(&json!({"tags": ["a"], "confidence": "high"}), 2),
            Err(IdeaError::ResponseShapeInvalid(_))
        ));
        assert!(matches!(
            TagResult::from_value(&json!({"tags": [1], "confidence": 0.5}), 2),
            Err(IdeaError::ResponseShapeInvalid(_))
        ));
    }

    #[test]
    fn clusters_accept_wrapped_and_bare_forms() {
        let bare = json!([{"id": "c1", "label": "Work", "memberIds": ["a"], "keywords": ["job"]}]);
        let wrapped = json!({"clusters": bare.clone()});
        assert_eq!(
            ClusterSet::from_value(&bare).unwrap(),
            ClusterSet::from_value(&wrapped).unwrap()
        );
    }

    #[test]
    fn clusters_fill_defaults_and_coerce_members() {
        let set = ClusterSet::from_value(&json!([
            {"label": "", "memberIds": [1, "b", null], "keywords": "oops"},
            "not an object",
            {"id": 7, "label": "Seven"}
        ]))
        .unwrap();

        assert_eq!(set.clusters.len(), 2);
        assert_eq!(set.clusters[0].id, "cluster-1");
        assert_eq!(set.clusters[0].label, "Cluster 1");
        assert_eq!(set.clusters[0].member_ids, ["1", "b"]);
        assert!(set.clusters[0].keywords.is_empty());
        assert_eq!(set.clusters[1].id, "7");
        assert!(set.clusters[1].member_ids.is_empty());
    }

    #[test]
    fn clusters_reject_other_shapes() {
        assert!(ClusterSet::from_value(&json!({"groups": []})).is_err());
        assert!(ClusterSet::from_value(&json!("text")).is_err());
    }

    #[test]
    fn insight_needs_some_content() {
        let draft = InsightDraft::from_value(&json!({"summary": 3, "titles": ["T"]})).unwrap();
        assert_eq!(draft.summary, "");
        assert_eq!(draft.titles, ["T"]);
        assert!(draft.next_steps.is_empty());

        assert!(matches!(
            InsightDraft::from_value(&json!({"summary": "", "next_steps": []})),
            Err(IdeaError::ResponseShapeInvalid(_))
        ));
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }
}
