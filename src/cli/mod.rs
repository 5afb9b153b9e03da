pub mod browse;
pub mod capture;
pub mod export;
pub mod import;
pub mod insight;
pub mod map;
pub mod report;
pub mod stats;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use ideacloud::config::IdeaCloudConfig;
use ideacloud::flows::IdeaCloud;
use ideacloud::model::transport::HttpTransport;
use ideacloud::IdeaError;

/// Open the store and HTTP model client from config.
fn open(config: &IdeaCloudConfig) -> anyhow::Result<IdeaCloud<HttpTransport>> {
    IdeaCloud::open(config)
}

/// Spinner on stderr while a model call is in flight.
fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Pass a flow error through, printing a hint first when there is nothing to analyze.
fn with_hint(err: IdeaError) -> IdeaError {
    if let Some(hint) = empty_input_hint(&err) {
        eprintln!("{hint}");
    }
    err
}

fn empty_input_hint(err: &IdeaError) -> Option<&'static str> {
    err.is_empty_input()
        .then_some("Hint: capture a few ideas with `ideacloud capture \"...\"` first.")
}

/// One-line preview of a fragment text.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}…")
    } else if flat.is_empty() {
        "…".to_string()
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_only_for_empty_input() {
        assert!(empty_input_hint(&IdeaError::NoFragments).is_some());
        assert!(empty_input_hint(&IdeaError::EmptyText).is_some());
        assert!(empty_input_hint(&IdeaError::ConfigurationMissing).is_none());
        assert!(empty_input_hint(&IdeaError::RequestFailed("x".into())).is_none());
    }

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("a\n  b", 60), "a b");
        assert_eq!(preview("abcdef", 3), "abc…");
        assert_eq!(preview("   ", 10), "…");
    }
}
