//! One synchronization run: scan, reconcile, report, copy

use std::path::PathBuf;

use dirsync_fs::Snapshot;
use serde::Serialize;

use crate::Result;
use crate::config::SyncConfig;
use crate::executor::{CopyRecord, ExecutionReport, SyncExecutor};
use crate::reconcile::{ActionSummary, ReconciliationTable};
use crate::report::{SnapshotSink, WorkbookSink};

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub actions: ActionSummary,
    pub execution: ExecutionReport,
    /// Keys shared by more than one file on a side
    pub collisions: Vec<String>,
    /// Paths left out of a snapshot because their metadata was unreadable
    pub skipped: Vec<PathBuf>,
}

/// Plan produced without side effects.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub client: Snapshot,
    pub dev: Snapshot,
    pub table: ReconciliationTable,
}

/// Runs the stages in strict order; report persistence happens before any
/// copy, so a persistence failure leaves both trees untouched.
#[derive(Debug, Clone)]
pub struct SyncPipeline {
    config: SyncConfig,
    dry_run: bool,
}

impl SyncPipeline {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Skip copies and the report write, only compute what would happen.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Scan both sides and reconcile them.
    pub fn plan(&self) -> Result<SyncPlan> {
        let client = Snapshot::scan(&self.config.client_folder, &self.config.scan)?;
        tracing::debug!(root = ?client.root(), files = client.len(), "Scanned client folder");

        let dev = Snapshot::scan(&self.config.dev_folder, &self.config.scan)?;
        tracing::debug!(root = ?dev.root(), files = dev.len(), "Scanned dev folder");

        let table = ReconciliationTable::reconcile(&client, &dev);
        Ok(SyncPlan { client, dev, table })
    }

    /// Full run with no progress reporting.
    pub fn run(&self) -> Result<RunSummary> {
        self.run_with(|_| {})
    }

    /// Full run persisting the report into the configured workbook.
    pub fn run_with<F>(&self, progress: F) -> Result<RunSummary>
    where
        F: FnMut(&CopyRecord),
    {
        let mut sink = WorkbookSink::new(&self.config.report_file)
            .with_sheet_name(&self.config.report.sheet_name)
            .create_if_missing(self.config.report.create_if_missing);
        self.run_into(&mut sink, progress)
    }

    /// Full run persisting the report into `sink`.
    pub fn run_into<F>(&self, sink: &mut dyn SnapshotSink, progress: F) -> Result<RunSummary>
    where
        F: FnMut(&CopyRecord),
    {
        let plan = self.plan()?;

        if self.dry_run {
            tracing::info!("Dry run, leaving the snapshot report untouched");
        } else {
            sink.persist(&plan.table)?;
        }

        let execution = SyncExecutor::new(&self.config.client_folder, &self.config.dev_folder)
            .dry_run(self.dry_run)
            .execute_with(&plan.table, progress)?;

        let collisions = plan
            .client
            .collisions()
            .iter()
            .chain(plan.dev.collisions())
            .cloned()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        let skipped = plan
            .client
            .skipped()
            .iter()
            .chain(plan.dev.skipped())
            .cloned()
            .collect();

        Ok(RunSummary {
            actions: plan.table.summary(),
            execution,
            collisions,
            skipped,
        })
    }
}
