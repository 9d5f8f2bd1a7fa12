//! Run configuration
//!
//! Loaded from TOML, JSON or YAML through [`dirsync_fs::ConfigStore`]:
//!
//! ```toml
//! client_folder = "/srv/client"
//! dev_folder = "/srv/dev"
//! report_file = "folder_sync.xlsx"
//!
//! [report]
//! sheet_name = "Last Snapshot"
//! create_if_missing = true
//!
//! [scan]
//! key_mode = "base-name"
//! on_access_error = "abort"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::path::{Path, PathBuf};

use dirsync_fs::{ConfigStore, ScanOptions};
use serde::{Deserialize, Serialize};

use crate::report::DEFAULT_SHEET_NAME;
use crate::{Error, Result};

/// Where to write the snapshot report and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub sheet_name: String,
    pub create_if_missing: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            create_if_missing: false,
        }
    }
}

/// Everything one sync run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub client_folder: PathBuf,
    pub dev_folder: PathBuf,
    pub report_file: PathBuf,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub scan: ScanOptions,
}

impl SyncConfig {
    pub fn new(
        client_folder: impl Into<PathBuf>,
        dev_folder: impl Into<PathBuf>,
        report_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client_folder: client_folder.into(),
            dev_folder: dev_folder.into(),
            report_file: report_file.into(),
            report: ReportSettings::default(),
            scan: ScanOptions::default(),
        }
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// - Fs errors if the file is missing, has an unknown extension or does
    ///   not parse
    /// - [`Error::Config`] if the parsed values are unusable
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Self = ConfigStore::new().load(path)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        config.validate()?;

        tracing::debug!(
            ?path,
            client = ?config.client_folder,
            dev = ?config.dev_folder,
            report = ?config.report_file,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    /// Anchor relative folder and report paths at `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.client_folder,
            &mut self.dev_folder,
            &mut self.report_file,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Reject configurations that cannot describe a sync.
    pub fn validate(&self) -> Result<()> {
        if self.client_folder.as_os_str().is_empty() {
            return Err(Error::config("client_folder is empty"));
        }
        if self.dev_folder.as_os_str().is_empty() {
            return Err(Error::config("dev_folder is empty"));
        }
        if self.report_file.as_os_str().is_empty() {
            return Err(Error::config("report_file is empty"));
        }
        if self.client_folder == self.dev_folder {
            return Err(Error::config(format!(
                "client_folder and dev_folder are the same directory: {}",
                self.client_folder.display()
            )));
        }
        if self.report.sheet_name.trim().is_empty() {
            return Err(Error::config("report.sheet_name is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirsync_fs::{AccessErrorPolicy, KeyMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_fill_optional_sections() {
        let config: SyncConfig = toml::from_str(
            r#"
            client_folder = "client"
            dev_folder = "dev"
            report_file = "folder_sync.xlsx"
            "#,
        )
        .unwrap();

        assert_eq!(config.report, ReportSettings::default());
        assert_eq!(config.report.sheet_name, "Last Snapshot");
        assert_eq!(config.scan.key_mode, KeyMode::BaseName);
        assert_eq!(config.scan.on_access_error, AccessErrorPolicy::Abort);
    }

    #[test]
    fn relative_paths_anchor_at_base() {
        let mut config = SyncConfig::new("client", "/abs/dev", "report.xlsx");
        config.resolve_relative_to(Path::new("/etc/dirsync"));

        assert_eq!(config.client_folder, PathBuf::from("/etc/dirsync/client"));
        assert_eq!(config.dev_folder, PathBuf::from("/abs/dev"));
        assert_eq!(config.report_file, PathBuf::from("/etc/dirsync/report.xlsx"));
    }

    #[test]
    fn identical_folders_are_rejected() {
        let config = SyncConfig::new("/same", "/same", "report.xlsx");
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn blank_sheet_name_is_rejected() {
        let mut config = SyncConfig::new("/client", "/dev", "report.xlsx");
        config.report.sheet_name = "  ".into();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }
}
