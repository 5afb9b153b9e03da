//! CLI `report` command: write a printable Markdown report.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::path::Path;

use ideacloud::config::IdeaCloudConfig;
use ideacloud::ideas::{clusters, insight, report, stats};

pub fn report(config: &IdeaCloudConfig, output: Option<&Path>) -> Result<()> {
    let conn = ideacloud::db::open_database(config.resolved_db_path())?;

    let stats = stats::idea_stats(&conn)?;
    let cached = insight::load_insight(&conn)?;
    let clusters = clusters::list_clusters(&conn)?;
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let markdown = report::render_report(&stats, cached.as_ref(), &clusters, &generated_at);

    match output {
        Some(path) => {
            std::fs::write(path, &markdown)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            eprintln!("Report written to {}.", path.display());
        }
        None => print!("{markdown}"),
    }
    Ok(())
}
