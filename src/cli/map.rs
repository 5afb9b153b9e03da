//! CLI `map` command: recompute clusters.

use anyhow::Result;

use super::{open, spinner, with_hint};
use ideacloud::config::IdeaCloudConfig;
use ideacloud::flows::MapOutcome;

pub async fn map(config: &IdeaCloudConfig) -> Result<()> {
    let cloud = open(config)?;

    let pb = spinner("recomputing clusters");
    let result = cloud.recompute_clusters().await;
    pb.finish_and_clear();

    match result.map_err(with_hint)? {
        MapOutcome::NothingNew { clusters } => {
            println!(
                "No new fragments since the last recompute; keeping {} cluster(s).",
                clusters.len()
            );
        }
        MapOutcome::Recomputed {
            clusters,
            assigned,
            carried_over,
        } => {
            println!("Recomputed {} cluster(s), {assigned} fragment(s) assigned.", clusters.len());
            if carried_over > 0 {
                println!("{carried_over} cluster id(s) carried over from the previous map.");
            }
            for cluster in &clusters {
                println!("  {:<16} {} ({})", cluster.id, cluster.label, cluster.fragment_ids.len());
            }
        }
    }

    cloud.close()?;
    Ok(())
}
