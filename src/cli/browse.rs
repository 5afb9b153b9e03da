//! CLI read-only listings: `recent`, `tags`, and `clusters`.

use anyhow::Result;

use super::preview;
use ideacloud::config::IdeaCloudConfig;
use ideacloud::ideas::types::{Fragment, Priority};
use ideacloud::ideas::{clusters, fragments};

fn print_fragment(f: &Fragment) {
    println!(
        "{}  [{}★ {}]  {}",
        f.created_at,
        f.star,
        Priority::from_star(f.star),
        f.id
    );
    println!("  {}", preview(&f.text, 120));
    if !f.tags.is_empty() {
        let tags: Vec<String> = f.tags.iter().map(|t| format!("#{t}")).collect();
        println!("  {}", tags.join(" "));
    }
}

/// Show the newest fragments.
pub fn recent(config: &IdeaCloudConfig, limit: usize) -> Result<()> {
    let conn = ideacloud::db::open_database(config.resolved_db_path())?;
    let list = fragments::recent_fragments(&conn, limit)?;

    if list.is_empty() {
        println!("No fragments yet. Capture your first idea with `ideacloud capture \"...\"`.");
        return Ok(());
    }
    for f in &list {
        print_fragment(f);
    }
    Ok(())
}

/// Show fragments carrying a tag.
pub fn tagged(config: &IdeaCloudConfig, tag: &str) -> Result<()> {
    let conn = ideacloud::db::open_database(config.resolved_db_path())?;
    let tag = tag.trim_start_matches('#');
    let list = fragments::fragments_with_tag(&conn, tag)?;

    println!("{} fragment(s) tagged #{tag}", list.len());
    for f in &list {
        print_fragment(f);
    }
    Ok(())
}

/// Show stored clusters, optionally only those with a given label.
pub fn list_clusters(config: &IdeaCloudConfig, label: Option<&str>) -> Result<()> {
    let conn = ideacloud::db::open_database(config.resolved_db_path())?;
    let list = match label {
        Some(label) => clusters::clusters_by_label(&conn, label)?,
        None => clusters::list_clusters(&conn)?,
    };

    if list.is_empty() {
        println!("No clusters stored. Run `ideacloud map` to compute them.");
        return Ok(());
    }

    for cluster in &list {
        println!("{}  {} ({} fragments)", cluster.id, cluster.label, cluster.fragment_ids.len());
        if !cluster.tag_hints.is_empty() {
            println!("  keywords: {}", cluster.tag_hints.join(", "));
        }
        for member in &cluster.fragment_ids {
            match fragments::get_fragment(&conn, member)? {
                Some(f) => println!("  - {}", preview(&f.text, 60)),
                None => println!("  - ({member} not found)"),
            }
        }
    }
    Ok(())
}
