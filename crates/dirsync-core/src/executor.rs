//! Carries out the copies a reconciliation table asks for

use std::fmt;
use std::path::{Path, PathBuf};

use dirsync_fs::io::copy_preserving_mtime;
use serde::Serialize;

use crate::Result;
use crate::reconcile::{ReconciliationEntry, ReconciliationTable, SyncAction};

/// One of the two synchronized folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    Client,
    Dev,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => f.write_str("Client"),
            Self::Dev => f.write_str("Dev"),
        }
    }
}

/// One copy, performed or (under dry run) planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyRecord {
    pub name: String,
    pub action: SyncAction,
    /// Folder the file was copied into
    pub to: Side,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Bytes written; zero under dry run
    pub bytes: u64,
}

/// Everything an execution did, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub dry_run: bool,
    pub copies: Vec<CopyRecord>,
}

impl ExecutionReport {
    pub fn copied(&self) -> usize {
        self.copies.len()
    }

    pub fn bytes(&self) -> u64 {
        self.copies.iter().map(|c| c.bytes).sum()
    }
}

/// Copies newer files over stale ones between the client and dev roots.
#[derive(Debug, Clone)]
pub struct SyncExecutor {
    client_root: PathBuf,
    dev_root: PathBuf,
    dry_run: bool,
}

impl SyncExecutor {
    pub fn new(client_root: impl Into<PathBuf>, dev_root: impl Into<PathBuf>) -> Self {
        Self {
            client_root: client_root.into(),
            dev_root: dev_root.into(),
            dry_run: false,
        }
    }

    /// Plan copies without touching the filesystem.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute the table. See [`SyncExecutor::execute_with`].
    pub fn execute(&self, table: &ReconciliationTable) -> Result<ExecutionReport> {
        self.execute_with(table, |_| {})
    }

    /// Execute every pending row in table order, calling `progress` after
    /// each copy.
    ///
    /// Stops at the first failure; copies already made stay in place.
    ///
    /// # Errors
    ///
    /// - [`dirsync_fs::Error::SourceVanished`] if a source file disappeared
    ///   after the scan
    /// - [`dirsync_fs::Error::Io`] for any other copy failure
    pub fn execute_with<F>(
        &self,
        table: &ReconciliationTable,
        mut progress: F,
    ) -> Result<ExecutionReport>
    where
        F: FnMut(&CopyRecord),
    {
        let mut report = ExecutionReport {
            dry_run: self.dry_run,
            copies: Vec::new(),
        };

        for entry in table.pending() {
            let Some((to, source, destination)) = self.route(entry) else {
                continue;
            };

            let bytes = if self.dry_run {
                0
            } else {
                copy_preserving_mtime(&source, &destination)?
            };

            let record = CopyRecord {
                name: entry.name.clone(),
                action: entry.action,
                to,
                source,
                destination,
                bytes,
            };
            tracing::debug!(
                name = %record.name,
                action = %record.action,
                destination = ?record.destination,
                dry_run = self.dry_run,
                "Executed sync action"
            );
            progress(&record);
            report.copies.push(record);
        }

        tracing::debug!(copies = report.copied(), "Execution finished");
        Ok(report)
    }

    /// Destination side plus source and destination paths for a copy row;
    /// `None` for rows in sync.
    ///
    /// The destination keeps the stale side's own location when it has one,
    /// otherwise mirrors the source's location.
    fn route(&self, entry: &ReconciliationEntry) -> Option<(Side, PathBuf, PathBuf)> {
        let client_path = entry.client_path.as_deref();
        let dev_path = entry.dev_path.as_deref();

        let (to, source_root, source_path, destination_root, destination_path) = match entry.action
        {
            SyncAction::CopyToDev => (
                Side::Dev,
                self.client_root.as_path(),
                client_path,
                self.dev_root.as_path(),
                dev_path,
            ),
            SyncAction::CopyToClient => (
                Side::Client,
                self.dev_root.as_path(),
                dev_path,
                self.client_root.as_path(),
                client_path,
            ),
            SyncAction::InSync => return None,
        };

        let source_path = source_path.unwrap_or(Path::new(&entry.name));
        let destination_path = destination_path.unwrap_or(source_path);
        Some((
            to,
            source_root.join(source_path),
            destination_root.join(destination_path),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirsync_fs::FileObservation;
    use dirsync_test_utils::date;
    use pretty_assertions::assert_eq;

    fn executor() -> SyncExecutor {
        SyncExecutor::new("/client", "/dev")
    }

    #[test]
    fn route_keeps_existing_destination_location() {
        let client = FileObservation::new("a.txt", date("2024-01-02")).with_relative_path("docs/a.txt");
        let dev = FileObservation::new("a.txt", date("2024-01-01")).with_relative_path("old/a.txt");
        let entry = ReconciliationEntry::new("a.txt", Some(&client), Some(&dev));

        assert_eq!(
            executor().route(&entry),
            Some((
                Side::Dev,
                PathBuf::from("/client/docs/a.txt"),
                PathBuf::from("/dev/old/a.txt")
            ))
        );
    }

    #[test]
    fn route_mirrors_source_location_when_missing() {
        let dev = FileObservation::new("c.txt", date("2024-01-01")).with_relative_path("nested/c.txt");
        let entry = ReconciliationEntry::new("c.txt", None, Some(&dev));

        assert_eq!(
            executor().route(&entry),
            Some((
                Side::Client,
                PathBuf::from("/dev/nested/c.txt"),
                PathBuf::from("/client/nested/c.txt")
            ))
        );
    }

    #[test]
    fn in_sync_rows_have_no_route() {
        let entry =
            ReconciliationEntry::from_times("same", Some(date("2024-01-01")), Some(date("2024-01-01")));
        assert_eq!(executor().route(&entry), None);
    }

    #[test]
    fn dry_run_reports_without_copying() {
        let table = ReconciliationTable::from_entries([
            ReconciliationEntry::from_times("a", Some(date("2024-01-01")), None),
            ReconciliationEntry::from_times("b", None, Some(date("2024-01-01"))),
        ]);

        let mut seen = Vec::new();
        let report = SyncExecutor::new("/does/not/exist", "/nor/this")
            .dry_run(true)
            .execute_with(&table, |record| seen.push(record.name.clone()))
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.copied(), 2);
        assert_eq!(report.bytes(), 0);
        assert_eq!(seen, ["a", "b"]);
    }
}
