//! Error types for dirsync-report

use std::path::PathBuf;

/// Result type for dirsync-report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing a workbook
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook file does not exist
    #[error("Workbook not found: {path}")]
    WorkbookNotFound { path: PathBuf },

    /// The file is not a readable zip package
    #[error("Invalid workbook package: {message}")]
    InvalidPackage { message: String },

    /// A package part could not be parsed or written
    #[error("Malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    /// A part the workbook structure requires is absent
    #[error("Workbook part missing: {part}")]
    MissingPart { part: String },

    /// Spreadsheet applications refuse to open a workbook with this sheet name
    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: String },

    /// Atomic write of the rebuilt package failed
    #[error(transparent)]
    Fs(#[from] dirsync_fs::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        Self::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn package(err: impl std::fmt::Display) -> Self {
        Self::InvalidPackage {
            message: err.to_string(),
        }
    }
}
