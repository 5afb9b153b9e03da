//! Core record definitions.
//!
//! Defines [`Fragment`] (a captured note), [`Priority`] (its star level),
//! [`Cluster`] (a model-proposed grouping), and [`CachedInsight`] (the singleton
//! summary cache).

use serde::{Deserialize, Serialize};

/// Fixed primary key of the singleton insight cache row.
pub const INSIGHT_CACHE_ID: &str = "latest";

/// A captured idea fragment, matching the `fragments` table.
///
/// Field names follow the interchange format (`createdAt`, `clusterId`) so an
/// exported file can be imported back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// UUID v7 for fragments captured here; arbitrary strings for imported ones.
    pub id: String,
    pub text: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Priority level, `0..=3`.
    pub star: u8,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    /// Related fragment ids. Reserved; stored and exported but never interpreted.
    #[serde(default)]
    pub rel: Vec<String>,
}

impl Fragment {
    /// True when the text has no visible content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The four priority levels a fragment can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Seed,
    Curious,
    Notable,
    Top,
}

impl Priority {
    pub const MAX_STAR: u8 = 3;

    /// Map a stored star value; anything above the top level saturates.
    pub fn from_star(star: u8) -> Self {
        match star {
            0 => Self::Seed,
            1 => Self::Curious,
            2 => Self::Notable,
            _ => Self::Top,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Seed => "seed of an idea",
            Self::Curious => "a little curious",
            Self::Notable => "notable idea",
            Self::Top => "top priority",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A model-proposed group of fragments, matching the `clusters` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub label: String,
    /// Keyword hints returned by the model.
    pub tag_hints: Vec<String>,
    /// Member fragment ids in model order.
    pub fragment_ids: Vec<String>,
    /// Constant 1.0 for now.
    pub score: f64,
}

/// The singleton cached summary, matching the `insight_cache` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedInsight {
    pub summary: String,
    pub next_steps: Vec<String>,
    pub titles: Vec<String>,
    /// Fragment ids already folded into the summary. Only ever grows.
    pub member_ids: Vec<String>,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}
