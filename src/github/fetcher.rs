//! The remote fetcher seam.
//!
//! `RunFetcher` is the logical operation the poller consumes: "list current
//! runs for repository X". The production implementation lives on
//! [`GitHubClient`](super::GitHubClient); tests substitute scripted
//! implementations.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{RepoId, RunConclusion, RunStatus};

use super::error::FetchError;

/// A point-in-time view of a workflow run as reported by the remote system.
///
/// Every field mirrors the loose remote payload: the remote may omit any of
/// them, and a snapshot without an `id` is malformed (rejected downstream by
/// the reconciler, never inserted).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteRunSnapshot {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub status: Option<RunStatus>,

    #[serde(default)]
    pub conclusion: Option<RunConclusion>,

    #[serde(default)]
    pub run_started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub html_url: Option<String>,
}

/// Issues the logical call "list current runs for repository X".
///
/// Returns a finite, order-unspecified sequence of remote run snapshots. The
/// result is a watch-set of "things that might have changed", not a complete
/// repository history.
///
/// Implementations must classify failures as [`FetchError`] so the sweep can
/// isolate them per repository.
pub trait RunFetcher {
    /// Fetch the current run snapshots for one repository.
    fn fetch_runs(
        &self,
        repo: &RepoId,
    ) -> impl Future<Output = Result<Vec<RemoteRunSnapshot>, FetchError>> + Send;
}

impl<F: RunFetcher + Send + Sync> RunFetcher for std::sync::Arc<F> {
    fn fetch_runs(
        &self,
        repo: &RepoId,
    ) -> impl Future<Output = Result<Vec<RemoteRunSnapshot>, FetchError>> + Send {
        self.as_ref().fetch_runs(repo)
    }
}
