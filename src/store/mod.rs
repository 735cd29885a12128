//! The run store contract.
//!
//! The store is the single persisted view of tracked repositories and their
//! workflow runs. The poller reads it every sweep and writes only deltas; the
//! reconciler's apply path is the one write path in the core. The storage
//! engine itself is an external concern - implementations serialize their own
//! writes, and the core treats their failures as opaque.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{RepoId, RunId, RunUpdate, TrackedRepo, WorkflowRun};

mod memory;

pub use memory::MemoryRunStore;

/// Errors surfaced by a run store.
///
/// Opaque to the poller: a failed read or write is logged with its cause and
/// never aborts a sweep.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert targeted a run id that already exists.
    #[error("run {0} already exists")]
    DuplicateRun(RunId),

    /// An update targeted a run id with no local entry.
    #[error("run {0} not found")]
    RunNotFound(RunId),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Read/write contract for the persisted run view.
///
/// Implementations serialize their own writes; the core takes no additional
/// lock beyond calling them from the single sweep task.
pub trait RunStore: Send + Sync {
    /// All currently tracked repositories.
    fn list_tracked_repositories(&self) -> Result<Vec<TrackedRepo>, StoreError>;

    /// The most recent runs for one repository, newest-started first,
    /// at most `limit` entries. This is the reconciler's lookback window.
    fn recent_runs(&self, repo: &RepoId, limit: usize) -> Result<Vec<WorkflowRun>, StoreError>;

    /// Looks up a single run by id, regardless of repository.
    fn get_run(&self, id: RunId) -> Result<Option<WorkflowRun>, StoreError>;

    /// Inserts a newly observed run. Fails if the id already exists.
    fn insert_run(&self, run: WorkflowRun) -> Result<(), StoreError>;

    /// Applies a partial update to an existing run.
    fn update_run(&self, id: RunId, update: RunUpdate) -> Result<(), StoreError>;

    /// Records a successful poll of a repository.
    ///
    /// A no-op if the repository was untracked mid-sweep.
    fn record_polled(&self, repo: &RepoId, at: DateTime<Utc>) -> Result<(), StoreError>;
}
