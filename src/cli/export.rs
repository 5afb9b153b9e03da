use anyhow::{Context, Result};
use std::path::Path;

use ideacloud::config::IdeaCloudConfig;
use ideacloud::ideas::transfer;

/// Export all fragments as a JSON array, to `output` or stdout.
pub fn export(config: &IdeaCloudConfig, output: Option<&Path>) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = ideacloud::db::open_database(&db_path)?;

    let json = transfer::export_json(&conn)?;
    let count = ideacloud::ideas::fragments::count_fragments(&conn)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Exported {count} fragments to {}.", path.display());
        }
        None => {
            println!("{json}");
            eprintln!("Exported {count} fragments.");
        }
    }

    Ok(())
}
