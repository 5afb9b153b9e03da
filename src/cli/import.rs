use anyhow::{Context, Result};
use std::path::Path;

use super::open;
use ideacloud::config::IdeaCloudConfig;

/// Import fragments from a JSON file, upserting by id.
///
/// Records that fail validation are skipped and listed; the rest are written in
/// one transaction.
pub fn import(config: &IdeaCloudConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let cloud = open(config)?;
    let report = cloud.import_json(&json)?;

    println!("Import complete:");
    println!("  Fragments imported: {}", report.imported);
    println!("  Replaced existing:  {}", report.replaced);
    if !report.rejected.is_empty() {
        println!("  Skipped (invalid):  {}", report.rejected.len());
        for rejection in &report.rejected {
            println!(
                "    #{} {}: {}",
                rejection.index,
                rejection.id.as_deref().unwrap_or("(no id)"),
                rejection.reason
            );
        }
    }

    cloud.close()?;
    Ok(())
}
