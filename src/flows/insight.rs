//! Insight flow: summarize fragments and merge the result into the cached
//! singleton.
//!
//! Only fragments not yet covered by the cache are sent. Coverage is a ratchet:
//! ids are added by each merge and dropped only by a from-scratch regeneration,
//! so a deleted fragment stays counted as covered.

use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;

use super::guard::OperationKind;
use super::IdeaCloud;
use crate::error::{IdeaError, Result};
use crate::ideas::types::{CachedInsight, Fragment};
use crate::ideas::{fragments, insight};
use crate::model::prompts::PreviousInsight;
use crate::model::transport::ChatTransport;

#[derive(Debug, Clone)]
pub enum InsightOutcome {
    /// No uncovered fragments with text; the cache is returned as stored.
    NothingNew(CachedInsight),
    /// The model was called and the cache rewritten.
    Updated {
        insight: CachedInsight,
        /// Fragments summarized in this pass.
        summarized: usize,
        /// True when the pass merged into an existing cache.
        merged: bool,
    },
}

impl InsightOutcome {
    pub fn insight(&self) -> &CachedInsight {
        match self {
            Self::NothingNew(insight) | Self::Updated { insight, .. } => insight,
        }
    }

    pub fn is_nothing_new(&self) -> bool {
        matches!(self, Self::NothingNew(_))
    }
}

impl<T: ChatTransport> IdeaCloud<T> {
    /// Generate the insight, or merge new fragments into the cached one.
    pub async fn generate_insight(&self) -> Result<InsightOutcome> {
        let _lease = self.guard.try_acquire(OperationKind::Insight)?;
        self.run_insight(false).await
    }

    /// Summarize everything from scratch, ignoring the cache. The cached row is
    /// only overwritten once the new summary is in hand.
    pub async fn regenerate_insight(&self) -> Result<InsightOutcome> {
        let _lease = self.guard.try_acquire(OperationKind::Insight)?;
        self.run_insight(true).await
    }

    async fn run_insight(&self, from_scratch: bool) -> Result<InsightOutcome> {
        let (all, cached) = {
            let conn = self.db();
            let cached = if from_scratch {
                None
            } else {
                insight::load_insight(&conn)?
            };
            (fragments::list_fragments(&conn)?, cached)
        };

        if all.is_empty() {
            return Err(IdeaError::NoFragments);
        }
        if all.iter().all(Fragment::is_blank) {
            return Err(IdeaError::EmptyText);
        }

        let Some(cached) = cached else {
            let texts = non_blank_texts(all.iter());
            let draft = self.model.summarize(&texts, None).await?;
            let record = CachedInsight {
                summary: draft.summary,
                next_steps: draft.next_steps,
                titles: draft.titles,
                member_ids: all.iter().map(|f| f.id.clone()).collect(),
                updated_at: now(),
            };
            insight::save_insight(&self.db(), &record)?;
            tracing::info!(covered = record.member_ids.len(), "insight generated");
            return Ok(InsightOutcome::Updated {
                insight: record,
                summarized: texts.len().min(self.model.limits().max_fragments),
                merged: false,
            });
        };

        let covered: HashSet<&str> = cached.member_ids.iter().map(String::as_str).collect();
        let fresh: Vec<&Fragment> = all
            .iter()
            .filter(|f| !covered.contains(f.id.as_str()))
            .collect();

        if fresh.is_empty() {
            tracing::info!("no new fragments since the cached insight");
            return Ok(InsightOutcome::NothingNew(cached));
        }

        let member_ids = merge_coverage(&cached.member_ids, fresh.iter().map(|f| f.id.as_str()));
        let texts = non_blank_texts(fresh.iter().copied());

        if texts.is_empty() {
            // new fragments with no text: fold them in without asking the model
            let record = CachedInsight {
                member_ids,
                ..cached
            };
            insight::save_insight(&self.db(), &record)?;
            tracing::info!(blank = fresh.len(), "only blank fragments were new");
            return Ok(InsightOutcome::NothingNew(record));
        }

        let previous = PreviousInsight {
            summary: cached.summary.clone(),
            next_steps: cached.next_steps.clone(),
            titles: cached.titles.clone(),
            item_count: cached.member_ids.len(),
        };
        let draft = self.model.summarize(&texts, Some(&previous)).await?;

        let record = CachedInsight {
            summary: draft.summary,
            next_steps: draft.next_steps,
            titles: draft.titles,
            member_ids,
            updated_at: now(),
        };
        insight::save_insight(&self.db(), &record)?;
        tracing::info!(
            new = fresh.len(),
            covered = record.member_ids.len(),
            "insight merged"
        );

        Ok(InsightOutcome::Updated {
            insight: record,
            summarized: texts.len().min(self.model.limits().max_fragments),
            merged: true,
        })
    }
}

fn non_blank_texts<'a>(fragments: impl Iterator<Item = &'a Fragment>) -> Vec<String> {
    fragments
        .filter(|f| !f.is_blank())
        .map(|f| f.text.clone())
        .collect()
}

/// `old` followed by every id in `new` it does not already contain.
fn merge_coverage<'a>(old: &[String], new: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = old.iter().cloned().collect();
    let mut merged = old.to_vec();
    for id in new {
        if seen.insert(id.to_string()) {
            merged.push(id.to_string());
        }
    }
    merged
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_merge_is_a_superset_in_order() {
        let old = vec!["1".to_string(), "2".to_string()];
        let merged = merge_coverage(&old, ["3", "2", "4", "3"].into_iter());
        assert_eq!(merged, ["1", "2", "3", "4"]);
    }

    #[test]
    fn coverage_merge_with_nothing_new_is_identity() {
        let old = vec!["1".to_string()];
        assert_eq!(merge_coverage(&old, std::iter::empty()), old);
    }
}
