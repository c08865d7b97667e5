//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::state::FeedbackStore;
use crate::storage::Storage;

/// Top-level feedback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Directory holding one JSON file per collection.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Write sample courses/instructors and empty collections on first run.
    #[serde(default = "default_true")]
    pub seed_on_startup: bool,
    /// How many responses the dashboard lists as recent activity.
    #[serde(default = "default_recent_limit")]
    pub recent_activity_limit: usize,
    /// Indent persisted JSON.
    #[serde(default = "default_true")]
    pub pretty_json: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./feedback-data")
}
fn default_true() -> bool {
    true
}
fn default_recent_limit() -> usize {
    5
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            seed_on_startup: true,
            recent_activity_limit: default_recent_limit(),
            pretty_json: true,
        }
    }
}

impl FeedbackConfig {
    /// Open file storage in `data_dir` and bootstrap a store from it.
    pub fn open_store(&self) -> Result<FeedbackStore> {
        let storage = Storage::open_dir(&self.data_dir)
            .with_context(|| format!("failed to open data dir {}", self.data_dir.display()))?
            .with_pretty_json(self.pretty_json);
        Ok(FeedbackStore::open_with(storage, self.seed_on_startup))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied through verbatim and never rescanned. An
/// unterminated `${` is kept as literal text.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + 2 + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `feedback.toml` in the current directory
/// 2. `~/.config/feedback/config.toml`
///
/// `FEEDBACK_DATA_DIR` overrides `data_dir`.
pub fn load_config() -> Result<FeedbackConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<FeedbackConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("feedback.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => FeedbackConfig::default(),
    };

    if let Ok(dir) = std::env::var("FEEDBACK_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

/// Parse a TOML config string, resolving `${VAR}` references in `data_dir`.
pub fn parse_config(content: &str) -> Result<FeedbackConfig> {
    let mut config: FeedbackConfig = toml::from_str(content)?;
    let raw = config.data_dir.to_string_lossy().into_owned();
    config.data_dir = PathBuf::from(resolve_env_vars(&raw));
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("feedback"))
}
