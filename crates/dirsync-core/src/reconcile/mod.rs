//! Comparison of a client and a dev snapshot
//!
//! - **action**: the per-file verdict and the rule that produces it
//! - **table**: the outer join of both snapshots, one verdict per key

mod action;
mod table;

pub use action::{SyncAction, decide};
pub use table::{ActionSummary, ReconciliationEntry, ReconciliationTable};
