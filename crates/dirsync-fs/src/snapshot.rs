//! Directory snapshots
//!
//! A [`Snapshot`] maps a file key to the file's last modification time for
//! every regular file below a root directory. Keys are derived according to
//! [`KeyMode`]; when two files share a key the most recently modified one is
//! kept and the key is recorded as a collision.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::path::{KeyMode, serialize_slash};
use crate::{Error, Result};

/// One file found during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObservation {
    /// Snapshot key
    pub name: String,
    /// Path relative to the scanned root, exactly as found on disk.
    /// Serialized `/`-separated.
    #[serde(serialize_with = "serialize_slash")]
    pub relative_path: PathBuf,
    /// Last modification time as stored by the filesystem
    pub modified_at: DateTime<Utc>,
}

impl FileObservation {
    /// Observation for a file sitting directly under the root.
    pub fn new(name: impl Into<String>, modified_at: DateTime<Utc>) -> Self {
        let name = name.into();
        Self {
            relative_path: PathBuf::from(&name),
            name,
            modified_at,
        }
    }

    pub fn with_relative_path(mut self, relative_path: impl Into<PathBuf>) -> Self {
        self.relative_path = relative_path.into();
        self
    }
}

/// What to do when a file's metadata cannot be read mid-scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessErrorPolicy {
    /// Fail the whole scan
    #[default]
    Abort,
    /// Log, record the path in [`Snapshot::skipped`] and keep scanning
    Skip,
}

/// Options controlling a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub key_mode: KeyMode,
    pub on_access_error: AccessErrorPolicy,
}

/// Point-in-time view of one directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    root: PathBuf,
    entries: BTreeMap<String, FileObservation>,
    collisions: BTreeSet<String>,
    skipped: Vec<PathBuf>,
}

impl Snapshot {
    /// Recursively scan `root`.
    ///
    /// # Errors
    ///
    /// - [`Error::PathNotFound`] if `root` is missing, not a directory, or unreadable
    /// - [`Error::Access`] if a file's metadata cannot be read and the policy is
    ///   [`AccessErrorPolicy::Abort`]
    pub fn scan(root: &Path, options: &ScanOptions) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::PathNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut snapshot = Self::empty(root);

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let observed = entry
                .map_err(|err| walk_error(root, err))
                .and_then(|entry| observe(root, &entry, options.key_mode));

            match observed {
                Ok(Some(observation)) => snapshot.insert(observation),
                Ok(None) => {}
                Err(Error::Access { path, source })
                    if options.on_access_error == AccessErrorPolicy::Skip =>
                {
                    tracing::warn!(?path, error = %source, "Skipping unreadable entry");
                    snapshot.skipped.push(path);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            ?root,
            files = snapshot.len(),
            collisions = snapshot.collisions.len(),
            skipped = snapshot.skipped.len(),
            "Scanned directory"
        );
        Ok(snapshot)
    }

    /// Build a snapshot from already known observations.
    ///
    /// Colliding keys are resolved the same way a scan resolves them.
    pub fn from_observations(
        root: impl Into<PathBuf>,
        observations: impl IntoIterator<Item = FileObservation>,
    ) -> Self {
        let mut snapshot = Self::empty(root);
        for observation in observations {
            snapshot.insert(observation);
        }
        snapshot
    }

    fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: BTreeMap::new(),
            collisions: BTreeSet::new(),
            skipped: Vec::new(),
        }
    }

    fn insert(&mut self, observation: FileObservation) {
        match self.entries.entry(observation.name.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(observation);
            }
            btree_map::Entry::Occupied(mut slot) => {
                tracing::warn!(
                    key = %observation.name,
                    kept = %slot.get().relative_path.display(),
                    other = %observation.relative_path.display(),
                    "Files share a snapshot key"
                );
                self.collisions.insert(observation.name.clone());
                if observation.modified_at > slot.get().modified_at {
                    slot.insert(observation);
                }
            }
        }
    }

    /// The scanned root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FileObservation> {
        self.entries.get(name)
    }

    pub fn modified_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.entries.get(name).map(|o| o.modified_at)
    }

    /// Observations ordered by key
    pub fn iter(&self) -> impl Iterator<Item = &FileObservation> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Keys shared by more than one file during the scan
    pub fn collisions(&self) -> &BTreeSet<String> {
        &self.collisions
    }

    /// Entries skipped under [`AccessErrorPolicy::Skip`]
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }
}

fn observe(root: &Path, entry: &DirEntry, key_mode: KeyMode) -> Result<Option<FileObservation>> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return Ok(None);
    }

    // Symlinks count when they point at a regular file
    let metadata = if file_type.is_symlink() {
        match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(None),
            Err(e) => return Err(Error::access(entry.path(), e)),
        }
    } else if file_type.is_file() {
        entry
            .metadata()
            .map_err(|e| walk_error(root, e))?
    } else {
        return Ok(None);
    };

    let modified = metadata
        .modified()
        .map_err(|e| Error::access(entry.path(), e))?;

    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    let Some(name) = key_mode.key_for(relative) else {
        return Ok(None);
    };

    Ok(Some(FileObservation {
        name,
        relative_path: relative.to_path_buf(),
        modified_at: DateTime::<Utc>::from(modified),
    }))
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    if err.depth() == 0 {
        return Error::PathNotFound {
            path: root.to_path_buf(),
        };
    }
    let path = err.path().unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    Error::Access { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn from_observations_keeps_newest_on_collision() {
        let snapshot = Snapshot::from_observations(
            "/client",
            [
                FileObservation::new("notes.txt", at(1)).with_relative_path("a/notes.txt"),
                FileObservation::new("notes.txt", at(5)).with_relative_path("b/notes.txt"),
                FileObservation::new("notes.txt", at(3)).with_relative_path("c/notes.txt"),
            ],
        );

        assert_eq!(snapshot.len(), 1);
        let kept = snapshot.get("notes.txt").unwrap();
        assert_eq!(kept.relative_path, Path::new("b/notes.txt"));
        assert_eq!(kept.modified_at, at(5));
        assert!(snapshot.collisions().contains("notes.txt"));
    }

    #[test]
    fn names_are_ordered() {
        let snapshot = Snapshot::from_observations(
            "/dev",
            [
                FileObservation::new("c.txt", at(1)),
                FileObservation::new("a.txt", at(2)),
                FileObservation::new("b.txt", at(3)),
            ],
        );
        let names: Vec<_> = snapshot.names().collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }
}
