//! In-memory reference store.
//!
//! Backs the binary when no external store is wired in, and every scheduler
//! test. Tracked repositories are managed through the inherent
//! `track`/`untrack` methods - repository creation and deletion are external
//! user actions, not core operations, so they sit outside the `RunStore`
//! contract.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::types::{RepoId, RunId, RunUpdate, TrackedRepo, WorkflowRun};

use super::{RunStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    repos: Vec<TrackedRepo>,
    runs: HashMap<RunId, WorkflowRun>,
}

/// A `RunStore` held entirely in process memory behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    inner: Mutex<Inner>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins tracking a repository. Returns false if it was already tracked.
    pub fn track(&self, id: RepoId) -> bool {
        let mut inner = match self.locked() {
            Ok(inner) => inner,
            Err(_) => return false,
        };
        if inner.repos.iter().any(|r| r.id == id) {
            return false;
        }
        inner.repos.push(TrackedRepo::new(id, Utc::now()));
        true
    }

    /// Stops tracking a repository. Its runs are retained; purge is an
    /// external concern.
    pub fn untrack(&self, id: &RepoId) {
        if let Ok(mut inner) = self.locked() {
            inner.repos.retain(|r| &r.id != id);
        }
    }

    fn locked(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
    }
}

impl RunStore for MemoryRunStore {
    fn list_tracked_repositories(&self) -> Result<Vec<TrackedRepo>, StoreError> {
        Ok(self.locked()?.repos.clone())
    }

    fn recent_runs(&self, repo: &RepoId, limit: usize) -> Result<Vec<WorkflowRun>, StoreError> {
        let inner = self.locked()?;
        let mut runs: Vec<WorkflowRun> = inner
            .runs
            .values()
            .filter(|run| &run.repo == repo)
            .cloned()
            .collect();
        // Newest-started first; runs with no start time sort last.
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs.truncate(limit);
        Ok(runs)
    }

    fn get_run(&self, id: RunId) -> Result<Option<WorkflowRun>, StoreError> {
        Ok(self.locked()?.runs.get(&id).cloned())
    }

    fn insert_run(&self, run: WorkflowRun) -> Result<(), StoreError> {
        let mut inner = self.locked()?;
        if inner.runs.contains_key(&run.id) {
            return Err(StoreError::DuplicateRun(run.id));
        }
        inner.runs.insert(run.id, run);
        Ok(())
    }

    fn update_run(&self, id: RunId, update: RunUpdate) -> Result<(), StoreError> {
        let mut inner = self.locked()?;
        let run = inner.runs.get_mut(&id).ok_or(StoreError::RunNotFound(id))?;
        run.status = update.status;
        run.conclusion = update.conclusion;
        if update.completed_at.is_some() {
            run.completed_at = update.completed_at;
        }
        Ok(())
    }

    fn record_polled(&self, repo: &RepoId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.locked()?;
        if let Some(tracked) = inner.repos.iter_mut().find(|r| &r.id == repo) {
            tracked.last_polled_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RunConclusion, RunStatus};
    use chrono::TimeZone;

    fn repo() -> RepoId {
        RepoId::new("acme", "widgets")
    }

    fn run(id: u64, started_minute: u32) -> WorkflowRun {
        WorkflowRun {
            id: RunId(id),
            repo: repo(),
            workflow_name: "CI".to_string(),
            status: RunStatus::Queued,
            conclusion: None,
            started_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, started_minute, 0).unwrap()),
            completed_at: None,
            html_url: None,
        }
    }

    #[test]
    fn track_is_idempotent() {
        let store = MemoryRunStore::new();
        assert!(store.track(repo()));
        assert!(!store.track(repo()));
        assert_eq!(store.list_tracked_repositories().unwrap().len(), 1);
    }

    #[test]
    fn untrack_removes_repo_but_keeps_runs() {
        let store = MemoryRunStore::new();
        store.track(repo());
        store.insert_run(run(1, 0)).unwrap();

        store.untrack(&repo());

        assert!(store.list_tracked_repositories().unwrap().is_empty());
        assert!(store.get_run(RunId(1)).unwrap().is_some());
    }

    #[test]
    fn recent_runs_orders_newest_first_and_limits() {
        let store = MemoryRunStore::new();
        store.insert_run(run(1, 1)).unwrap();
        store.insert_run(run(2, 3)).unwrap();
        store.insert_run(run(3, 2)).unwrap();

        let recent = store.recent_runs(&repo(), 2).unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, RunId(2));
        assert_eq!(recent[1].id, RunId(3));
    }

    #[test]
    fn recent_runs_scopes_by_repo() {
        let store = MemoryRunStore::new();
        store.insert_run(run(1, 0)).unwrap();
        let mut other = run(2, 1);
        other.repo = RepoId::new("acme", "gadgets");
        store.insert_run(other).unwrap();

        let recent = store.recent_runs(&repo(), 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, RunId(1));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = MemoryRunStore::new();
        store.insert_run(run(1, 0)).unwrap();
        assert!(matches!(
            store.insert_run(run(1, 0)),
            Err(StoreError::DuplicateRun(RunId(1)))
        ));
    }

    #[test]
    fn update_applies_partial_fields() {
        let store = MemoryRunStore::new();
        store.insert_run(run(1, 0)).unwrap();

        let completed_at = Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap();
        store
            .update_run(
                RunId(1),
                RunUpdate {
                    status: RunStatus::Completed,
                    conclusion: Some(RunConclusion::Success),
                    completed_at: Some(completed_at),
                },
            )
            .unwrap();

        let stored = store.get_run(RunId(1)).unwrap().unwrap();
        assert_eq!(stored.status, RunStatus::Completed);
        assert_eq!(stored.conclusion, Some(RunConclusion::Success));
        assert_eq!(stored.completed_at, Some(completed_at));
        // Immutable fields untouched
        assert_eq!(stored.workflow_name, "CI");
    }

    #[test]
    fn update_unknown_run_is_an_error() {
        let store = MemoryRunStore::new();
        assert!(matches!(
            store.update_run(
                RunId(9),
                RunUpdate {
                    status: RunStatus::Completed,
                    conclusion: None,
                    completed_at: None,
                },
            ),
            Err(StoreError::RunNotFound(RunId(9)))
        ));
    }

    #[test]
    fn record_polled_sets_timestamp_and_tolerates_untracked() {
        let store = MemoryRunStore::new();
        store.track(repo());

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        store.record_polled(&repo(), at).unwrap();
        let repos = store.list_tracked_repositories().unwrap();
        assert_eq!(repos[0].last_polled_at, Some(at));

        // Repository untracked mid-sweep: recording is a no-op, not an error.
        store
            .record_polled(&RepoId::new("acme", "gone"), at)
            .unwrap();
    }
}
