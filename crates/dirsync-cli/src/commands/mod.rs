//! Command implementations for dirsync-cli

pub mod plan;
pub mod run;

pub use plan::run_plan;
pub use run::run_sync;

use std::path::Path;

use dirsync_core::SyncConfig;

use crate::error::{CliError, Result};

/// Load the configuration, pointing at `--config` when the file is missing.
pub fn load_config(path: &Path) -> Result<SyncConfig> {
    if !path.exists() {
        return Err(CliError::user(format!(
            "Configuration file not found: {} (pass --config or set DIRSYNC_CONFIG)",
            path.display()
        )));
    }
    Ok(SyncConfig::load(path)?)
}
