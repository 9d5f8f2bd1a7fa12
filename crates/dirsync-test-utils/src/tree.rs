//! Temporary directory trees with controlled modification times.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tempfile::TempDir;

/// A temporary directory whose files can be written with fixed mtimes.
///
/// # Example
///
/// ```rust,no_run
/// use dirsync_test_utils::{TestTree, date};
///
/// let tree = TestTree::new();
/// tree.write_at("docs/a.txt", "alpha", date("2024-03-01"));
/// tree.assert_file_contains("docs/a.txt", "alpha");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the tree.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the tree.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestTree::write: {}: {e}", path.display()));
        path
    }

    /// Write `content` to `relative` and stamp it with `modified_at`.
    pub fn write_at(&self, relative: &str, content: &str, modified_at: DateTime<Utc>) -> PathBuf {
        let path = self.write(relative, content);
        self.set_mtime(relative, modified_at);
        path
    }

    /// Set the modification time of an existing file.
    pub fn set_mtime(&self, relative: &str, modified_at: DateTime<Utc>) {
        let path = self.path(relative);
        File::options()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(SystemTime::from(modified_at)))
            .unwrap_or_else(|e| panic!("TestTree::set_mtime: {}: {e}", path.display()));
    }

    /// Modification time of `relative`.
    pub fn mtime(&self, relative: &str) -> DateTime<Utc> {
        let path = self.path(relative);
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|e| panic!("TestTree::mtime: {}: {e}", path.display()));
        DateTime::<Utc>::from(modified)
    }

    /// Content of `relative`.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("TestTree::read: {}: {e}", path.display()))
    }

    /// Whether `relative` exists.
    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `relative` does **not** exist.
    pub fn assert_file_not_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `relative` contains `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            self.path(relative).display(),
            content,
            file_content
        );
    }
}

/// A client tree, a dev tree and a scratch directory for the report workbook.
pub struct SyncFixture {
    pub client: TestTree,
    pub dev: TestTree,
    scratch: TempDir,
}

impl Default for SyncFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncFixture {
    pub fn new() -> Self {
        Self {
            client: TestTree::new(),
            dev: TestTree::new(),
            scratch: TempDir::new().unwrap(),
        }
    }

    /// Scratch directory, separate from both trees.
    pub fn scratch(&self) -> &Path {
        self.scratch.path()
    }

    /// Report workbook location inside the scratch directory.
    pub fn report_path(&self) -> PathBuf {
        self.scratch().join("folder_sync.xlsx")
    }

    /// Client has `a.txt` (2024-03-01) and `b.txt` (2024-03-05);
    /// dev has `b.txt` (2024-03-02) and `c.txt` (2024-03-03).
    pub fn with_reference_scenario(self) -> Self {
        use crate::time::date;

        self.client.write_at("a.txt", "client a", date("2024-03-01"));
        self.client.write_at("b.txt", "client b", date("2024-03-05"));
        self.dev.write_at("b.txt", "dev b", date("2024-03-02"));
        self.dev.write_at("c.txt", "dev c", date("2024-03-03"));
        self
    }
}
