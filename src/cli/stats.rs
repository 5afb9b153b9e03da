use anyhow::Result;

use ideacloud::config::IdeaCloudConfig;

/// Display store statistics in the terminal.
pub fn stats(config: &IdeaCloudConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = ideacloud::db::open_database(&db_path)?;

    let response = ideacloud::ideas::stats::idea_stats(&conn)?;
    let schema_version = ideacloud::db::migrations::get_schema_version(&conn)?;

    println!("IdeaCloud Statistics");
    println!("{}", "=".repeat(40));
    println!("  Fragments:           {}", response.total_fragments);
    println!("  Clusters in use:     {}", response.clusters_in_use);
    println!("  Stored clusters:     {}", response.stored_clusters);
    println!("  Tag diversity:       {}", response.tag_diversity);
    println!();
    println!("  Insight coverage:    {}", response.insight_coverage);
    match response.insight_updated_at {
        Some(ref at) => println!("  Insight updated:     {at}"),
        None => println!("  Insight updated:     (never)"),
    }
    println!();

    if let Some(ref oldest) = response.oldest_fragment {
        println!("Oldest fragment:       {oldest}");
    }
    if let Some(ref newest) = response.newest_fragment {
        println!("Newest fragment:       {newest}");
    }
    println!("Database:              {}", db_path.display());
    println!("Schema version:        {schema_version}");

    Ok(())
}
