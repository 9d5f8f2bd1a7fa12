//! The default command: a full synchronization run

use std::path::Path;

use colored::Colorize;
use dirsync_core::{CopyRecord, SyncPipeline};

use super::load_config;
use crate::error::Result;

/// Console line for one copy.
pub fn copy_message(record: &CopyRecord) -> String {
    format!("Copied {} to {} Folder.", record.name, record.to)
}

pub fn run_sync(config_path: &Path, dry_run: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let pipeline = SyncPipeline::new(config).dry_run(dry_run);

    let summary = pipeline.run_with(|record| {
        if dry_run {
            println!("{} {}", "[dry-run]".yellow(), copy_message(record));
        } else {
            println!("{}", copy_message(record));
        }
    })?;

    for key in &summary.collisions {
        eprintln!(
            "{} several files are named {}; the newest one was used",
            "warning:".yellow().bold(),
            key.cyan()
        );
    }
    for path in &summary.skipped {
        eprintln!(
            "{} skipped unreadable {}",
            "warning:".yellow().bold(),
            path.display()
        );
    }

    if dry_run {
        println!(
            "{} Dry run: {} ({} copies planned, report not written).",
            "=>".blue().bold(),
            summary.actions,
            summary.execution.copied()
        );
    } else {
        println!(
            "{}",
            "Folder synchronization completed successfully.".green()
        );
    }
    Ok(())
}
