//! CLI `capture` command: tag and store a new fragment.

use anyhow::Result;

use super::{open, spinner};
use ideacloud::config::IdeaCloudConfig;
use ideacloud::ideas::types::Priority;

pub async fn capture(config: &IdeaCloudConfig, text: &str, star: u8) -> Result<()> {
    let cloud = open(config)?;

    let pb = spinner("asking the model for tags");
    let result = cloud.capture(text, star).await;
    pb.finish_and_clear();
    let outcome = result?;

    let f = &outcome.fragment;
    println!("Saved {}", f.id);
    println!("  Priority:   {} ({})", f.star, Priority::from_star(f.star));
    if f.tags.is_empty() {
        println!("  Tags:       (none)");
    } else {
        println!("  Tags:       {}", f.tags.join(", "));
    }
    println!("  Confidence: {:.2}", outcome.confidence);

    cloud.close()?;
    Ok(())
}
