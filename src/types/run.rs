//! Workflow run state types.
//!
//! These types represent the locally persisted view of a workflow run as
//! reported by the remote CI system, updated incrementally by the poller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{RepoId, RunId};

/// The execution status of a workflow run.
///
/// Statuses form an ordered progression (queued → in_progress → completed);
/// the remote may skip `Queued` if it first reports a run already in progress.
/// The remote's `requested`/`waiting`/`pending` pre-execution states all map
/// to `Queued`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run is waiting to be scheduled.
    #[serde(alias = "requested", alias = "waiting", alias = "pending")]
    Queued,

    /// The run is executing.
    InProgress,

    /// The run finished; a conclusion is available.
    Completed,
}

impl RunStatus {
    /// Returns true if the run has finished executing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

/// How a completed workflow run ended.
///
/// Only meaningful when the run's status is [`RunStatus::Completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
}

impl RunConclusion {
    /// Returns true if the run ended successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, RunConclusion::Success)
    }
}

/// The locally persisted snapshot of a workflow run.
///
/// Created the first time a run appears in a remote snapshot, then updated
/// zero or more times as status/conclusion/timestamps change. Fields other
/// than `status`, `conclusion`, and `completed_at` are immutable post-insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Remote-assigned run id.
    pub id: RunId,

    /// The tracked repository this run belongs to. A run's id never changes
    /// owner.
    pub repo: RepoId,

    /// Display label for the workflow ("Unknown" when the remote omits it).
    pub workflow_name: String,

    /// Current execution status.
    pub status: RunStatus,

    /// Present only when `status == Completed`.
    pub conclusion: Option<RunConclusion>,

    /// When the run started executing, if known.
    pub started_at: Option<DateTime<Utc>>,

    /// When the run completed; only meaningful once `status == Completed`.
    pub completed_at: Option<DateTime<Utc>>,

    /// Opaque external reference to the run; immutable once set.
    pub html_url: Option<String>,
}

/// The partial-update payload for a run.
///
/// Only these fields may change after insert; everything else on
/// [`WorkflowRun`] is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunUpdate {
    pub status: RunStatus,
    pub conclusion: Option<RunConclusion>,
    pub completed_at: Option<DateTime<Utc>>,
}
