//! Shared test utilities for the dirsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`time`]: fixed timestamps for deterministic mtimes
//! - [`tree`]: [`TestTree`] and [`SyncFixture`] builders for directory trees

pub mod time;
pub mod tree;

pub use time::{date, datetime};
pub use tree::{SyncFixture, TestTree};
