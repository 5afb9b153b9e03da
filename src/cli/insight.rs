//! CLI `insight` command: generate or merge the cached insight.

use anyhow::Result;

use super::{open, spinner, with_hint};
use ideacloud::config::IdeaCloudConfig;
use ideacloud::flows::InsightOutcome;
use ideacloud::ideas::types::CachedInsight;

pub async fn insight(config: &IdeaCloudConfig, fresh: bool) -> Result<()> {
    let cloud = open(config)?;

    let pb = spinner("summarizing fragments");
    let result = if fresh {
        cloud.regenerate_insight().await
    } else {
        cloud.generate_insight().await
    };
    pb.finish_and_clear();

    let outcome = result.map_err(with_hint)?;
    match &outcome {
        InsightOutcome::NothingNew(_) => {
            println!("No new fragments since the last insight; showing the cached one.");
        }
        InsightOutcome::Updated {
            summarized, merged, ..
        } => {
            if *merged {
                println!("Merged {summarized} new fragment(s) into the insight.");
            } else {
                println!("Summarized {summarized} fragment(s).");
            }
        }
    }
    println!();
    print_insight(outcome.insight());

    cloud.close()?;
    Ok(())
}

fn print_insight(insight: &CachedInsight) {
    println!("Summary");
    println!("{}", "=".repeat(40));
    println!("{}", insight.summary);
    println!();

    if !insight.next_steps.is_empty() {
        println!("Next steps:");
        for step in &insight.next_steps {
            println!("  - {step}");
        }
        println!();
    }
    if !insight.titles.is_empty() {
        println!("Title ideas:");
        for title in &insight.titles {
            println!("  - {title}");
        }
        println!();
    }
    println!(
        "Covers {} fragment(s), updated {}",
        insight.member_ids.len(),
        insight.updated_at
    );
}
