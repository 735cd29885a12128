//! Octocrab client wrapper for the GitHub Actions API.
//!
//! This module provides `GitHubClient`, which wraps an `Octocrab` instance.
//! Unlike a repo-scoped client, this wrapper spans every tracked repository:
//! the poller sweeps many repositories with one shared credential and one
//! shared, account-wide rate limit.

use octocrab::Octocrab;
use serde::Serialize;

use crate::types::{RepoId, RunId};

use super::error::FetchError;
use super::fetcher::{RemoteRunSnapshot, RunFetcher};

/// Default number of recent runs requested per repository.
pub const DEFAULT_PAGE_SIZE: u8 = 30;

#[derive(Debug, Serialize)]
struct ListRunsQuery {
    per_page: u8,
}

#[derive(Debug, serde::Deserialize)]
struct ListRunsResponse {
    workflow_runs: Vec<RemoteRunSnapshot>,
}

/// A GitHub API client for listing and dispatching workflow runs.
#[derive(Clone)]
pub struct GitHubClient {
    /// The underlying octocrab client.
    client: Octocrab,

    /// How many recent runs to request per repository.
    page_size: u8,
}

impl GitHubClient {
    /// Creates a new client from a pre-configured Octocrab instance.
    pub fn new(client: Octocrab, page_size: u8) -> Self {
        Self { client, page_size }
    }

    /// Creates a client from a bearer token.
    pub fn from_token(token: impl Into<String>, page_size: u8) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client, page_size))
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    /// Lists the most recent workflow runs for a repository, all statuses.
    ///
    /// Deliberately unfiltered: restricting to in-progress runs would mean a
    /// run that went queued → completed between sweeps never surfaces its
    /// terminal state.
    pub async fn list_workflow_runs(
        &self,
        repo: &RepoId,
    ) -> Result<Vec<RemoteRunSnapshot>, FetchError> {
        if repo.is_empty() {
            return Err(FetchError::not_found(format!(
                "empty repository identifier {repo:?}"
            )));
        }

        let route = format!("/repos/{}/{}/actions/runs", repo.owner, repo.name);
        let response: ListRunsResponse = self
            .client
            .get(
                route,
                Some(&ListRunsQuery {
                    per_page: self.page_size,
                }),
            )
            .await
            .map_err(FetchError::from_octocrab)?;

        Ok(response.workflow_runs)
    }

    /// Fetches a single workflow run by id.
    pub async fn get_workflow_run(
        &self,
        repo: &RepoId,
        run: RunId,
    ) -> Result<RemoteRunSnapshot, FetchError> {
        if repo.is_empty() {
            return Err(FetchError::not_found(format!(
                "empty repository identifier {repo:?}"
            )));
        }

        let route = format!("/repos/{}/{}/actions/runs/{}", repo.owner, repo.name, run);
        self.client
            .get(route, None::<&()>)
            .await
            .map_err(FetchError::from_octocrab)
    }

    /// Triggers a `workflow_dispatch` event for a workflow on the given ref.
    pub async fn dispatch_workflow(
        &self,
        repo: &RepoId,
        workflow_id: &str,
        git_ref: &str,
    ) -> Result<(), FetchError> {
        if repo.is_empty() {
            return Err(FetchError::not_found(format!(
                "empty repository identifier {repo:?}"
            )));
        }

        self.client
            .actions()
            .create_workflow_dispatch(&repo.owner, &repo.name, workflow_id, git_ref)
            .send()
            .await
            .map_err(FetchError::from_octocrab)
    }
}

impl RunFetcher for GitHubClient {
    async fn fetch_runs(&self, repo: &RepoId) -> Result<Vec<RemoteRunSnapshot>, FetchError> {
        self.list_workflow_runs(repo).await
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
