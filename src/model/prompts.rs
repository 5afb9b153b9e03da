//! System instructions and request payloads for the three model passes.

use serde::Serialize;

/// Appended to every system instruction.
pub const JSON_ONLY_SUFFIX: &str =
    "Respond with a single valid JSON value only. Do not wrap it in code fences or add prose.";

pub const TAG_INSTRUCTION: &str = "Extract at most two short tags from the note and return \
{\"tags\": [], \"confidence\": 0-1}. When one of the existing tags is close in meaning, \
reuse it instead of inventing a new one.";

pub const CLUSTER_INSTRUCTION: &str = "Group the given notes into 3 to 8 clusters and return an \
array of {\"id\": \"\", \"label\": \"\", \"memberIds\": [], \"keywords\": []}. When existing \
clusters are supplied, keep them wherever possible, fold the new notes in, and return the \
complete set of clusters.";

pub const SUMMARY_INSTRUCTION: &str = "Summarize the notes and return \
{\"summary\": \"\", \"next_steps\": [], \"titles\": []}.";

pub const MERGE_SUMMARY_INSTRUCTION: &str = "Merge the new notes into the existing summary and \
return {\"summary\": \"\", \"next_steps\": [], \"titles\": []}. Update the overall picture \
using what the previous summary already covers.";

#[derive(Debug, Serialize)]
pub struct TagPayload<'a> {
    pub text: &'a str,
    #[serde(rename = "existingTags")]
    pub existing_tags: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct FragmentSample<'a> {
    pub id: &'a str,
    pub text: &'a str,
    pub tags: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct ClusterHint<'a> {
    pub id: &'a str,
    pub label: &'a str,
    #[serde(rename = "memberIds")]
    pub member_ids: &'a [String],
    pub keywords: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct ClusterPayload<'a> {
    pub fragments: Vec<FragmentSample<'a>>,
    pub existing_clusters: Vec<ClusterHint<'a>>,
}

/// Prior insight sent as context for an incremental merge.
#[derive(Debug, Clone, Serialize)]
pub struct PreviousInsight {
    pub summary: String,
    pub next_steps: Vec<String>,
    pub titles: Vec<String>,
    /// Number of fragments the previous summary already covers.
    pub item_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SummaryPayload<'a> {
    Fresh {
        items: &'a [String],
    },
    Merge {
        new_items: &'a [String],
        previous_insight: &'a PreviousInsight,
    },
}

/// Full system message for an instruction.
pub fn system_message(instruction: &str) -> String {
    format!("{instruction}\n{JSON_ONLY_SUFFIX}")
}
