use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IdeaCloudConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub model: ModelConfig,
    pub limits: LimitsConfig,
    pub clustering: ClusteringConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Settings for the external chat-completion endpoint.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// Bearer credential. `None` makes every model-backed command fail early.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Linear backoff unit; attempt `n` waits `n * retry_backoff_ms`.
    pub retry_backoff_ms: u64,
    pub timeout_secs: u64,
}

/// Caps on how much of the store is sent to the model.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_fragments: usize,
    pub max_cluster_members: usize,
    pub max_cluster_keywords: usize,
    pub max_tags: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Carry old cluster ids over to the best-overlapping new cluster. Off by
    /// default: the model's ids are stored as returned.
    pub stabilize_ids: bool,
}

impl Default for IdeaCloudConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            model: ModelConfig::default(),
            limits: LimitsConfig::default(),
            clustering: ClusteringConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_ideacloud_dir()
            .join("ideas.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".into(),
            endpoint: "https://api.openai.com/v1".into(),
            temperature: 0.2,
            max_retries: 2,
            retry_backoff_ms: 300,
            timeout_secs: 60,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_fragments: 200,
            max_cluster_members: 200,
            max_cluster_keywords: 20,
            max_tags: 2,
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            stabilize_ids: false,
        }
    }
}

/// Returns `~/.ideacloud/`, or `./.ideacloud/` when no home directory is known.
pub fn default_ideacloud_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ideacloud")
}

/// Returns the default config file path: `~/.ideacloud/config.toml`
pub fn default_config_path() -> PathBuf {
    default_ideacloud_dir().join("config.toml")
}

impl IdeaCloudConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            IdeaCloudConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("IDEACLOUD_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("IDEACLOUD_LOG_LEVEL") {
            self.logging.log_level = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            if !val.trim().is_empty() {
                self.model.api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("IDEACLOUD_MODEL") {
            if !val.trim().is_empty() {
                self.model.model = val;
            }
        }
        if let Ok(val) = std::env::var("IDEACLOUD_ENDPOINT") {
            self.model.endpoint = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
