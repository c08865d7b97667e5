pub mod catalog;
pub mod check;
pub mod dashboard;
pub mod forms;
pub mod init;
pub mod list;
pub mod submit;
pub mod summary;

use anyhow::Result;

use feedback_core::config::{load_config_from, FeedbackConfig};
use feedback_core::FeedbackStore;

use crate::GlobalArgs;

/// Resolve config (with `--data-dir` applied) for a command.
pub fn config(global: &GlobalArgs) -> Result<FeedbackConfig> {
    let mut config = load_config_from(global.config.as_deref())?;
    if let Some(dir) = &global.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

/// Load config and bootstrap the store.
pub fn open_store(global: &GlobalArgs) -> Result<(FeedbackConfig, FeedbackStore)> {
    let config = config(global)?;
    tracing::debug!(data_dir = %config.data_dir.display(), "opening feedback store");
    let store = config.open_store()?;
    Ok((config, store))
}
