//! Tracked repository record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RepoId;

/// A repository the poller keeps in sync.
///
/// Created via explicit user action and deleted externally; the core reads
/// these records but never creates or removes them, and must tolerate a
/// repository disappearing mid-cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRepo {
    /// Composite `owner/name` key.
    pub id: RepoId,

    /// When tracking began.
    pub added_at: DateTime<Utc>,

    /// When the last successful poll of this repository completed.
    pub last_polled_at: Option<DateTime<Utc>>,
}

impl TrackedRepo {
    pub fn new(id: RepoId, added_at: DateTime<Utc>) -> Self {
        TrackedRepo {
            id,
            added_at,
            last_polled_at: None,
        }
    }
}
