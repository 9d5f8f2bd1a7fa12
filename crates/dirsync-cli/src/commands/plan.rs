//! Preview of the reconciliation table

use std::path::Path;

use colored::Colorize;
use dirsync_core::report::format_timestamp;
use dirsync_core::{ReconciliationEntry, SyncAction, SyncPipeline};

use super::load_config;
use crate::error::Result;

pub fn run_plan(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let plan = SyncPipeline::new(config).plan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan.table)?);
        return Ok(());
    }

    if plan.table.is_empty() {
        println!("{} Both folders are empty.", "OK".green().bold());
        return Ok(());
    }

    let width = plan
        .table
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("File".len());

    let header = format!(
        "{:<width$}  {:<20}  {:<20}  Sync Action",
        "File", "Last Modified_Client", "Last Modified_Dev"
    );
    println!("{}", header.bold());
    for entry in &plan.table {
        println!("{}", row(entry, width));
    }

    println!();
    println!("{} {}", "=>".blue().bold(), plan.table.summary());
    Ok(())
}

fn row(entry: &ReconciliationEntry, width: usize) -> String {
    let stamp = |t: Option<_>| t.map(format_timestamp).unwrap_or_else(|| "-".to_string());
    let action = match entry.action {
        SyncAction::CopyToClient => entry.action.label().cyan(),
        SyncAction::CopyToDev => entry.action.label().yellow(),
        SyncAction::InSync => entry.action.label().green(),
    };
    format!(
        "{:<width$}  {:<20}  {:<20}  {}",
        entry.name,
        stamp(entry.client_modified_at),
        stamp(entry.dev_modified_at),
        action
    )
}
