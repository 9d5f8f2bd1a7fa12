//! Snapshot report rendering and persistence

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use dirsync_report::{Cell, SheetData, WorkbookOptions};

use crate::reconcile::ReconciliationTable;
use crate::{Error, Result};

/// Sheet the report is written to unless configured otherwise
pub const DEFAULT_SHEET_NAME: &str = "Last Snapshot";

pub const HEADER: [&str; 4] = [
    "File",
    "Last Modified_Client",
    "Last Modified_Dev",
    "Sync Action",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock rendering used in the report.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Render the table as report rows, header first, rows in table order.
pub fn table_to_sheet(table: &ReconciliationTable) -> SheetData {
    let mut sheet = SheetData::with_header(HEADER);
    for entry in table {
        sheet.push_row(vec![
            Cell::text(entry.name.as_str()),
            Cell::optional_text(entry.client_modified_at.map(format_timestamp)),
            Cell::optional_text(entry.dev_modified_at.map(format_timestamp)),
            Cell::text(entry.action.label()),
        ]);
    }
    sheet
}

/// Destination for the reconciliation table of a run.
pub trait SnapshotSink {
    /// Store the table, replacing whatever the previous run stored.
    fn persist(&mut self, table: &ReconciliationTable) -> Result<()>;
}

/// Writes the table into a named sheet of an `.xlsx` workbook.
#[derive(Debug, Clone)]
pub struct WorkbookSink {
    path: PathBuf,
    sheet_name: String,
    options: WorkbookOptions,
}

impl WorkbookSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            options: WorkbookOptions::default(),
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    /// Start a fresh workbook when none exists yet.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.options.create_if_missing = create;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

impl SnapshotSink for WorkbookSink {
    fn persist(&mut self, table: &ReconciliationTable) -> Result<()> {
        let sheet = table_to_sheet(table);
        dirsync_report::replace_sheet(&self.path, &self.sheet_name, &sheet, &self.options).map_err(
            |source| Error::Persistence {
                path: self.path.clone(),
                source,
            },
        )?;

        tracing::debug!(
            path = ?self.path,
            sheet = %self.sheet_name,
            rows = table.len(),
            "Persisted snapshot report"
        );
        Ok(())
    }
}

/// Keeps every persisted table in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: Vec<ReconciliationTable>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[ReconciliationTable] {
        &self.tables
    }

    pub fn last(&self) -> Option<&ReconciliationTable> {
        self.tables.last()
    }
}

impl SnapshotSink for MemorySink {
    fn persist(&mut self, table: &ReconciliationTable) -> Result<()> {
        self.tables.push(table.clone());
        Ok(())
    }
}
