mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ideacloud::config::IdeaCloudConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ideacloud", version, about = "Capture idea fragments and let a language model tag, cluster, and summarize them")]
struct Cli {
    /// Config file (defaults to ~/.ideacloud/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tag a new fragment with the model and store it
    Capture {
        text: String,
        /// Priority level, 0 (seed of an idea) to 3 (top priority)
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
        star: u8,
    },
    /// Show the newest fragments
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show fragments carrying a tag
    Tags { tag: String },
    /// Recompute clusters with the model
    Map,
    /// List stored clusters
    Clusters {
        /// Only clusters with exactly this label
        #[arg(long)]
        label: Option<String>,
    },
    /// Generate the insight, merging new fragments into the cached one
    Insight {
        /// Discard the cached insight and summarize everything again
        #[arg(long)]
        fresh: bool,
    },
    /// Export all fragments as a JSON array
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import fragments from a JSON array, replacing records with the same id
    Import { file: PathBuf },
    /// Show store statistics
    Stats,
    /// Write a printable Markdown report of stats and the latest insight
    Report {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => IdeaCloudConfig::load_from(path)?,
        None => IdeaCloudConfig::load()?,
    };

    // Log to stderr so stdout stays clean for exported JSON and reports.
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Capture { text, star } => cli::capture::capture(&config, &text, star).await?,
        Command::Recent { limit } => cli::browse::recent(&config, limit)?,
        Command::Tags { tag } => cli::browse::tagged(&config, &tag)?,
        Command::Map => cli::map::map(&config).await?,
        Command::Clusters { label } => cli::browse::list_clusters(&config, label.as_deref())?,
        Command::Insight { fresh } => cli::insight::insight(&config, fresh).await?,
        Command::Export { output } => cli::export::export(&config, output.as_deref())?,
        Command::Import { file } => cli::import::import(&config, &file)?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Report { output } => cli::report::report(&config, output.as_deref())?,
    }

    Ok(())
}
