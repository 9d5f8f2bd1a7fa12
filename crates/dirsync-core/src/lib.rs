//! Core layer for dirsync
//!
//! Sits above the Layer 0 crates and below the CLI:
//!
//! ```text
//!                  dirsync-cli
//!                       |
//!                 dirsync-core
//!                  /        \
//!         dirsync-fs    dirsync-report
//! ```
//!
//! - **reconcile**: turns two snapshots into a decision table
//! - **executor**: carries out the copies the table asks for
//! - **report**: renders the table as a spreadsheet sheet
//! - **pipeline**: runs scan, reconcile, report and copy in order
//!
//! # Example
//!
//! ```no_run
//! use dirsync_core::{SyncConfig, SyncPipeline};
//!
//! fn example() -> dirsync_core::Result<()> {
//!     let config = SyncConfig::load("dirsync.toml".as_ref())?;
//!     let summary = SyncPipeline::new(config).run()?;
//!     println!("{}", summary.actions);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod reconcile;
pub mod report;

pub use config::{ReportSettings, SyncConfig};
pub use error::{Error, Result};
pub use executor::{CopyRecord, ExecutionReport, Side, SyncExecutor};
pub use pipeline::{RunSummary, SyncPipeline, SyncPlan};
pub use reconcile::{ActionSummary, ReconciliationEntry, ReconciliationTable, SyncAction, decide};
pub use report::{MemorySink, SnapshotSink, WorkbookSink, table_to_sheet};
