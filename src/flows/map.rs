//! Map flow: recompute clusters with the model and reassign fragments.
//!
//! The stored cluster table is replaced wholesale by what the model returns.
//! When `stabilize_ids` is turned on, each new cluster that overlaps an old one
//! inherits the old id, so cluster references survive a recompute whenever the
//! membership mostly does.

use std::collections::{HashMap, HashSet};

use super::guard::OperationKind;
use super::IdeaCloud;
use crate::error::{IdeaError, Result};
use crate::ideas::types::Cluster;
use crate::ideas::{clusters, fragments};
use crate::model::responses::ClusterSet;
use crate::model::transport::ChatTransport;

/// Cluster count the model is asked for.
const EXPECTED_CLUSTERS: std::ops::RangeInclusive<usize> = 3..=8;

#[derive(Debug, Clone)]
pub enum MapOutcome {
    /// Every fragment already has a cluster; nothing was sent.
    NothingNew { clusters: Vec<Cluster> },
    Recomputed {
        clusters: Vec<Cluster>,
        /// Fragments that ended up with a cluster reference.
        assigned: usize,
        /// Clusters whose id was carried over from the previous table.
        carried_over: usize,
    },
}

impl<T: ChatTransport> IdeaCloud<T> {
    /// Recompute the cluster table from the current fragments.
    pub async fn recompute_clusters(&self) -> Result<MapOutcome> {
        let _lease = self.guard.try_acquire(OperationKind::Map)?;

        let (all, previous) = {
            let conn = self.db();
            (fragments::list_fragments(&conn)?, clusters::list_clusters(&conn)?)
        };

        if all.is_empty() {
            return Err(IdeaError::NoFragments);
        }
        let unassigned = all.iter().filter(|f| f.cluster_id.is_none()).count();
        if unassigned == 0 && !previous.is_empty() {
            tracing::info!("no unassigned fragments, skipping cluster recompute");
            return Ok(MapOutcome::NothingNew { clusters: previous });
        }

        let set = self.model.cluster_fragments(&all, &previous).await?;
        let count = set.clusters.len();
        if !EXPECTED_CLUSTERS.contains(&count) {
            tracing::warn!(count, "model returned an unusual number of clusters");
        }

        let mut next = into_clusters(set);
        let carried_over = if self.clustering.stabilize_ids {
            stabilize_cluster_ids(&previous, &mut next)
        } else {
            0
        };

        let assignments = membership(&next);
        let assigned = {
            let mut conn = self.db();
            let tx = conn.transaction()?;
            clusters::replace_clusters(&tx, &next)?;
            let assigned = fragments::assign_clusters(&tx, &assignments)?;
            tx.commit()?;
            assigned
        };

        tracing::info!(
            clusters = next.len(),
            assigned,
            unassigned_before = unassigned,
            carried_over,
            "clusters recomputed"
        );

        Ok(MapOutcome::Recomputed {
            clusters: next,
            assigned,
            carried_over,
        })
    }
}

/// Turn model drafts into storable clusters with unique ids.
fn into_clusters(set: ClusterSet) -> Vec<Cluster> {
    let mut seen = HashSet::new();
    set.clusters
        .into_iter()
        .map(|draft| Cluster {
            id: unique_id(&draft.id, &mut seen),
            label: draft.label,
            tag_hints: draft.keywords,
            fragment_ids: draft.member_ids,
            score: 1.0,
        })
        .collect()
}

/// `base`, or `base-2`, `base-3`, ... if already taken. Records the result in `taken`.
fn unique_id(base: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Fragment id → cluster id. A fragment listed by several clusters ends up in
/// the last one.
fn membership(clusters: &[Cluster]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for cluster in clusters {
        for member in &cluster.fragment_ids {
            map.insert(member.clone(), cluster.id.clone());
        }
    }
    map
}

fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Give each new cluster the id of its best-overlapping old cluster.
///
/// Pairs are matched greedily by descending Jaccard overlap of member sets,
/// each old id used at most once. Unmatched clusters keep their own id, suffixed
/// if it now collides. Returns how many ids were carried over.
pub fn stabilize_cluster_ids(previous: &[Cluster], next: &mut [Cluster]) -> usize {
    if previous.is_empty() || next.is_empty() {
        return 0;
    }

    let old_sets: Vec<HashSet<&str>> = previous
        .iter()
        .map(|c| c.fragment_ids.iter().map(String::as_str).collect())
        .collect();
    let new_sets: Vec<HashSet<&str>> = next
        .iter()
        .map(|c| c.fragment_ids.iter().map(String::as_str).collect())
        .collect();

    let mut pairs = Vec::new();
    for (ni, new_set) in new_sets.iter().enumerate() {
        for (oi, old_set) in old_sets.iter().enumerate() {
            let score = jaccard(new_set, old_set);
            if score > 0.0 {
                pairs.push((score, ni, oi));
            }
        }
    }
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut matched: Vec<Option<usize>> = vec![None; next.len()];
    let mut used_old = vec![false; previous.len()];
    for (_, ni, oi) in pairs {
        if matched[ni].is_none() && !used_old[oi] {
            matched[ni] = Some(oi);
            used_old[oi] = true;
        }
    }

    let mut taken: HashSet<String> = matched
        .iter()
        .flatten()
        .map(|&oi| previous[oi].id.clone())
        .collect();
    let mut carried = 0;
    for (cluster, old) in next.iter_mut().zip(&matched) {
        match old {
            Some(oi) => {
                if cluster.id != previous[*oi].id {
                    tracing::debug!(from = %cluster.id, to = %previous[*oi].id, "carrying cluster id over");
                }
                cluster.id = previous[*oi].id.clone();
                carried += 1;
            }
            None => cluster.id = unique_id(&cluster.id, &mut taken),
        }
    }
    carried
}
