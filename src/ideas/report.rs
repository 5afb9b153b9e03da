//! Printable Markdown report of store statistics, clusters, and the latest insight.

use super::stats::IdeaStats;
use super::types::{CachedInsight, Cluster};

/// Render the report. `generated_at` is printed verbatim.
pub fn render_report(
    stats: &IdeaStats,
    insight: Option<&CachedInsight>,
    clusters: &[Cluster],
    generated_at: &str,
) -> String {
    let mut lines = vec![
        "# IdeaCloud report".to_string(),
        String::new(),
        format!("Generated {generated_at}"),
        String::new(),
        "## Overview".to_string(),
        String::new(),
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
        format!("| Fragments | {} |", stats.total_fragments),
        format!("| Clusters in use | {} |", stats.clusters_in_use),
        format!("| Tag diversity | {} |", stats.tag_diversity),
        format!("| Fragments covered by insight | {} |", stats.insight_coverage),
        String::new(),
    ];

    if !clusters.is_empty() {
        lines.push("## Clusters".to_string());
        lines.push(String::new());
        for cluster in clusters {
            let mut line = format!("- **{}** ({} fragments)", cluster.label, cluster.fragment_ids.len());
            if !cluster.tag_hints.is_empty() {
                line.push_str(": ");
                line.push_str(&cluster.tag_hints.join(", "));
            }
            lines.push(line);
        }
        lines.push(String::new());
    }

    lines.push("## Latest insight".to_string());
    lines.push(String::new());
    match insight {
        None => lines.push("No insight has been generated yet.".to_string()),
        Some(insight) => insight_section(&mut lines, insight),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn insight_section(lines: &mut Vec<String>, insight: &CachedInsight) {
    lines.push(format!("_Updated {}_", insight.updated_at));
    lines.push(String::new());
    if !insight.summary.is_empty() {
        lines.push(insight.summary.clone());
        lines.push(String::new());
    }
    if !insight.next_steps.is_empty() {
        lines.push("### Next steps".to_string());
        lines.push(String::new());
        for (i, step) in insight.next_steps.iter().enumerate() {
            lines.push(format!("{}. {step}", i + 1));
        }
        lines.push(String::new());
    }
    if !insight.titles.is_empty() {
        lines.push("### Title ideas".to_string());
        lines.push(String::new());
        for title in &insight.titles {
            lines.push(format!("- {title}"));
        }
    }
}
