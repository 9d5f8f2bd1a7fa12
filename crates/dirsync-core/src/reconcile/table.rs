//! The reconciliation table

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dirsync_fs::path::serialize_slash_opt;
use dirsync_fs::{FileObservation, Snapshot};
use serde::{Deserialize, Serialize};

use super::action::{SyncAction, decide};

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationEntry {
    pub name: String,
    /// Present iff the key exists in the client snapshot
    pub client_modified_at: Option<DateTime<Utc>>,
    /// Present iff the key exists in the dev snapshot
    pub dev_modified_at: Option<DateTime<Utc>>,
    /// Where the client copy lives, relative to the client root
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_slash_opt"
    )]
    pub client_path: Option<PathBuf>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_slash_opt"
    )]
    pub dev_path: Option<PathBuf>,
    pub action: SyncAction,
}

impl ReconciliationEntry {
    /// Build a row from whatever each side observed for `name`.
    pub fn new(
        name: impl Into<String>,
        client: Option<&FileObservation>,
        dev: Option<&FileObservation>,
    ) -> Self {
        let client_modified_at = client.map(|o| o.modified_at);
        let dev_modified_at = dev.map(|o| o.modified_at);
        Self {
            name: name.into(),
            client_modified_at,
            dev_modified_at,
            client_path: client.map(|o| o.relative_path.clone()),
            dev_path: dev.map(|o| o.relative_path.clone()),
            action: decide(client_modified_at, dev_modified_at),
        }
    }

    /// Row from bare timestamps, with paths equal to the name.
    pub fn from_times(
        name: impl Into<String>,
        client_modified_at: Option<DateTime<Utc>>,
        dev_modified_at: Option<DateTime<Utc>>,
    ) -> Self {
        let name = name.into();
        let client = client_modified_at.map(|t| FileObservation::new(name.clone(), t));
        let dev = dev_modified_at.map(|t| FileObservation::new(name.clone(), t));
        Self::new(name, client.as_ref(), dev.as_ref())
    }
}

/// Counts of each verdict in a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub copy_to_client: usize,
    pub copy_to_dev: usize,
    pub in_sync: usize,
}

impl ActionSummary {
    fn record(&mut self, action: SyncAction) {
        match action {
            SyncAction::CopyToClient => self.copy_to_client += 1,
            SyncAction::CopyToDev => self.copy_to_dev += 1,
            SyncAction::InSync => self.in_sync += 1,
        }
    }

    pub fn count(&self, action: SyncAction) -> usize {
        match action {
            SyncAction::CopyToClient => self.copy_to_client,
            SyncAction::CopyToDev => self.copy_to_dev,
            SyncAction::InSync => self.in_sync,
        }
    }

    /// Entries that need a copy
    pub fn copies(&self) -> usize {
        self.copy_to_client + self.copy_to_dev
    }

    pub fn total(&self) -> usize {
        self.copies() + self.in_sync
    }
}

impl fmt::Display for ActionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to client, {} to dev, {} in sync",
            self.copy_to_client, self.copy_to_dev, self.in_sync
        )
    }
}

/// Outer join of two snapshots with one verdict per key.
///
/// Rows are ordered newest first by client time, then by dev time. A missing
/// timestamp sorts after every present one; ties fall back to the name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReconciliationTable {
    entries: Vec<ReconciliationEntry>,
}

impl ReconciliationTable {
    /// Join `client` and `dev` on key and decide every row.
    pub fn reconcile(client: &Snapshot, dev: &Snapshot) -> Self {
        let names: BTreeSet<&str> = client.names().chain(dev.names()).collect();
        let table = Self::from_entries(
            names
                .into_iter()
                .map(|name| ReconciliationEntry::new(name, client.get(name), dev.get(name))),
        );

        tracing::debug!(
            client = client.len(),
            dev = dev.len(),
            rows = table.len(),
            summary = %table.summary(),
            "Reconciled snapshots"
        );
        table
    }

    /// Table from prepared rows, put into table order.
    pub fn from_entries(entries: impl IntoIterator<Item = ReconciliationEntry>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(table_order);
        Self { entries }
    }

    pub fn entries(&self) -> &[ReconciliationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReconciliationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ReconciliationEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Rows that need a copy, in table order.
    pub fn pending(&self) -> impl Iterator<Item = &ReconciliationEntry> {
        self.entries.iter().filter(|e| e.action.is_copy())
    }

    pub fn summary(&self) -> ActionSummary {
        let mut summary = ActionSummary::default();
        for entry in &self.entries {
            summary.record(entry.action);
        }
        summary
    }
}

impl<'a> IntoIterator for &'a ReconciliationTable {
    type Item = &'a ReconciliationEntry;
    type IntoIter = std::slice::Iter<'a, ReconciliationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn table_order(a: &ReconciliationEntry, b: &ReconciliationEntry) -> Ordering {
    newest_first(a.client_modified_at, b.client_modified_at)
        .then_with(|| newest_first(a.dev_modified_at, b.dev_modified_at))
        .then_with(|| a.name.cmp(&b.name))
}

/// Descending, with `None` after every `Some`.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
