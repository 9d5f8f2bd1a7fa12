//! Filesystem layer for dirsync
//!
//! Provides directory snapshots, timestamp-preserving copies, atomic writes
//! and format-agnostic configuration loading.

pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod snapshot;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::KeyMode;
pub use snapshot::{AccessErrorPolicy, FileObservation, ScanOptions, Snapshot};
