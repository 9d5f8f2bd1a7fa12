//! Error types for dirsync-core

use std::path::PathBuf;

/// Result type for dirsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or running a sync
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The snapshot report could not be opened, rebuilt or written
    #[error("Failed to persist snapshot report to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: dirsync_report::Error,
    },

    /// The run configuration is unusable
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Filesystem error from dirsync-fs
    #[error(transparent)]
    Fs(#[from] dirsync_fs::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
