//! Per-file sync verdicts

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What has to happen to one file so both sides match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    /// The dev copy is newer, or the client has no copy
    CopyToClient,
    /// The client copy is newer, or dev has no copy
    CopyToDev,
    /// Both copies carry the same modification time
    InSync,
}

impl SyncAction {
    pub const ALL: [SyncAction; 3] = [Self::CopyToClient, Self::CopyToDev, Self::InSync];

    /// Label used in the report and on the console
    pub fn label(self) -> &'static str {
        match self {
            Self::CopyToClient => "Copy to Client",
            Self::CopyToDev => "Copy to Dev",
            Self::InSync => "In Sync",
        }
    }

    /// Whether carrying out the action touches the filesystem
    pub fn is_copy(self) -> bool {
        !matches!(self, Self::InSync)
    }

    /// The same verdict seen with the client and dev roles exchanged.
    pub fn mirrored(self) -> Self {
        match self {
            Self::CopyToClient => Self::CopyToDev,
            Self::CopyToDev => Self::CopyToClient,
            Self::InSync => Self::InSync,
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict for one file from its two optional modification times.
///
/// Rules apply in order: a missing client copy wins first, then a missing
/// dev copy, then the newer timestamp. Equal timestamps are in sync.
pub fn decide(client: Option<DateTime<Utc>>, dev: Option<DateTime<Utc>>) -> SyncAction {
    match (client, dev) {
        (None, _) => SyncAction::CopyToClient,
        (_, None) => SyncAction::CopyToDev,
        (Some(client), Some(dev)) => match client.cmp(&dev) {
            Ordering::Greater => SyncAction::CopyToDev,
            Ordering::Less => SyncAction::CopyToClient,
            Ordering::Equal => SyncAction::InSync,
        },
    }
}
