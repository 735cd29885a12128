//! Diffing remote snapshots against the local run view.
//!
//! `reconcile` is pure: given one repository's remote snapshot set and the
//! prior local window, it computes the minimal insert/update actions needed to
//! converge. `apply_actions` is the single store-writer path in the core and
//! carries the per-action error isolation and the cross-repository id guard.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::github::RemoteRunSnapshot;
use crate::store::RunStore;
use crate::types::{RepoId, RunConclusion, RunId, RunStatus, RunUpdate, WorkflowRun};

/// Workflow name used when the remote omits one.
const UNKNOWN_WORKFLOW: &str = "Unknown";

/// Errors raised while interpreting a remote snapshot.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The remote snapshot carried no run id and cannot be stored.
    #[error("remote snapshot for {repo} is missing a run id")]
    MalformedSnapshot { repo: RepoId },
}

/// A single store mutation the reconciler decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// First sighting of a run id: create the full local record.
    Insert(WorkflowRun),

    /// Status or conclusion changed: write only the mutable fields.
    Update { id: RunId, update: RunUpdate },
}

impl ReconcileAction {
    /// The run id this action targets.
    pub fn run_id(&self) -> RunId {
        match self {
            ReconcileAction::Insert(run) => run.id,
            ReconcileAction::Update { id, .. } => *id,
        }
    }
}

/// Computes the actions needed to converge the local window to the remote
/// snapshot set.
///
/// - Unseen run id → `Insert` (status defaults to queued, name to "Unknown")
/// - Seen run id with a `status`/`conclusion` difference → `Update`
/// - No difference → no action; this is the common case and costs no write
///
/// Duplicate ids within `remote` keep the last-seen entry. Snapshots without
/// an id are rejected and logged. A remote regression of a completed run is
/// logged and overwritten defensively.
pub fn reconcile(
    repo: &RepoId,
    remote: &[RemoteRunSnapshot],
    prior: &[WorkflowRun],
) -> Vec<ReconcileAction> {
    let prior_by_id: HashMap<RunId, &WorkflowRun> =
        prior.iter().map(|run| (run.id, run)).collect();

    // Duplicate ids in one snapshot set: the last-seen entry wins.
    let mut last_seen: HashMap<RunId, usize> = HashMap::new();
    for (idx, snapshot) in remote.iter().enumerate() {
        if let Some(id) = snapshot.id {
            last_seen.insert(RunId(id), idx);
        }
    }

    let mut actions = Vec::new();

    for (idx, snapshot) in remote.iter().enumerate() {
        let id = match snapshot.id {
            Some(id) => RunId(id),
            None => {
                let err = ReconcileError::MalformedSnapshot { repo: repo.clone() };
                warn!(repo = %repo, error = %err, "rejecting malformed remote snapshot");
                continue;
            }
        };

        if last_seen.get(&id) != Some(&idx) {
            continue;
        }

        let status = snapshot.status.unwrap_or(RunStatus::Queued);
        let conclusion = conclusion_for(status, snapshot.conclusion);
        let completed_at = completed_at_for(status, snapshot.updated_at);

        match prior_by_id.get(&id) {
            None => {
                actions.push(ReconcileAction::Insert(WorkflowRun {
                    id,
                    repo: repo.clone(),
                    workflow_name: snapshot
                        .name
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_WORKFLOW.to_string()),
                    status,
                    conclusion,
                    started_at: snapshot.run_started_at,
                    completed_at,
                    html_url: snapshot.html_url.clone(),
                }));
            }
            Some(local) => {
                if local.status == status && local.conclusion == conclusion {
                    continue;
                }

                if local.status.is_terminal() && !status.is_terminal() {
                    // The remote is assumed monotonic per run id; overwrite
                    // defensively rather than crash.
                    warn!(
                        repo = %repo,
                        run = %id,
                        local_status = ?local.status,
                        remote_status = ?status,
                        "remote regressed a completed run; overwriting"
                    );
                }

                actions.push(ReconcileAction::Update {
                    id,
                    update: RunUpdate {
                        status,
                        conclusion,
                        completed_at,
                    },
                });
            }
        }
    }

    actions
}

/// A conclusion is only ever meaningful on a completed run.
fn conclusion_for(status: RunStatus, conclusion: Option<RunConclusion>) -> Option<RunConclusion> {
    if status.is_terminal() { conclusion } else { None }
}

/// The completion time derives from the remote's update time, and only once
/// the run has actually completed.
fn completed_at_for(
    status: RunStatus,
    updated_at: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if status.is_terminal() { updated_at } else { None }
}

/// Applies actions to the store in emission order. Returns how many writes
/// were applied.
///
/// A failed write for one run never blocks the others: store errors are
/// logged per action. Before inserting, the run id is looked up globally -
/// an id already owned by a different repository is a data-integrity error
/// (logged, skipped, never merged), while an id already present under the
/// same repository means the run aged out of the lookback window and is
/// applied as an update instead.
pub fn apply_actions<S: RunStore + ?Sized>(
    store: &S,
    repo: &RepoId,
    actions: Vec<ReconcileAction>,
) -> usize {
    let mut applied = 0;

    for action in actions {
        match action {
            ReconcileAction::Insert(run) => match store.get_run(run.id) {
                Ok(Some(existing)) if existing.repo != *repo => {
                    warn!(
                        run = %run.id,
                        repo = %repo,
                        owner = %existing.repo,
                        "remote reported a run id owned by another repository; ignoring"
                    );
                }
                Ok(Some(_)) => {
                    debug!(
                        run = %run.id,
                        repo = %repo,
                        "run re-appeared outside the lookback window; applying as update"
                    );
                    let update = RunUpdate {
                        status: run.status,
                        conclusion: run.conclusion,
                        completed_at: run.completed_at,
                    };
                    if let Err(err) = store.update_run(run.id, update) {
                        warn!(run = %run.id, repo = %repo, error = %err, "run update failed");
                    } else {
                        applied += 1;
                    }
                }
                Ok(None) => {
                    let id = run.id;
                    if let Err(err) = store.insert_run(run) {
                        warn!(run = %id, repo = %repo, error = %err, "run insert failed");
                    } else {
                        applied += 1;
                    }
                }
                Err(err) => {
                    warn!(run = %run.id, repo = %repo, error = %err, "run lookup failed");
                }
            },
            ReconcileAction::Update { id, update } => {
                if let Err(err) = store.update_run(id, update) {
                    warn!(run = %id, repo = %repo, error = %err, "run update failed");
                } else {
                    applied += 1;
                }
            }
        }
    }

    applied
}
