//! The poll scheduler: drives the sweep loop.
//!
//! One dedicated tokio task executes sweeps; at most one sweep is ever in
//! flight. Within a sweep, repositories are fetched and reconciled
//! sequentially to bound outstanding remote requests and keep the backoff
//! semantics simple. The wait between sweeps is a cancellable sleep:
//! `stop()` wakes it immediately instead of waiting out the remaining delay.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::github::{FetchError, RunFetcher};
use crate::store::RunStore;
use crate::types::RepoId;

use super::backoff::Backoff;
use super::config::PollerConfig;
use super::reconcile::{apply_actions, reconcile};

/// Aggregate outcome of one sweep, the only signal fed to the backoff
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// How many repositories the sweep visited.
    pub repos: usize,

    /// How many of them failed to fetch.
    pub fetch_failures: usize,
}

impl SweepOutcome {
    /// True when every fetch in the sweep succeeded.
    pub fn is_clean(&self) -> bool {
        self.fetch_failures == 0
    }
}

/// Lifecycle of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStatus {
    /// Not started.
    Idle,
    /// The cycle loop is active.
    Running,
    /// Terminated; cannot be restarted.
    Stopped,
}

enum State {
    Idle,
    Running {
        shutdown: CancellationToken,
        task: JoinHandle<()>,
    },
    Stopped,
}

/// Owns the polling lifecycle: `Idle → Running → Stopped`.
///
/// Only one scheduler instance should run per deployment; a second `start()`
/// call on a running scheduler is a no-op, not an error.
pub struct PollScheduler<S> {
    config: PollerConfig,
    store: Arc<S>,
    state: Mutex<State>,
}

impl<S> PollScheduler<S>
where
    S: RunStore + 'static,
{
    /// Creates an idle scheduler over the given store.
    pub fn new(config: PollerConfig, store: Arc<S>) -> Self {
        PollScheduler {
            config,
            store,
            state: Mutex::new(State::Idle),
        }
    }

    /// Current lifecycle state.
    pub async fn status(&self) -> SchedulerStatus {
        match *self.state.lock().await {
            State::Idle => SchedulerStatus::Idle,
            State::Running { .. } => SchedulerStatus::Running,
            State::Stopped => SchedulerStatus::Stopped,
        }
    }

    /// Starts polling with the given fetcher.
    ///
    /// Executes one full sweep before returning, so callers observe at least
    /// one attempt, then schedules the periodic loop. A no-op when already
    /// running or stopped.
    pub async fn start<F>(&self, fetcher: F)
    where
        F: RunFetcher + Send + Sync + 'static,
    {
        let mut state = self.state.lock().await;
        match *state {
            State::Running { .. } => {
                info!("poller already running");
                return;
            }
            State::Stopped => {
                warn!("poller was stopped; not restarting");
                return;
            }
            State::Idle => {}
        }

        let mut backoff = Backoff::new(self.config.backoff_floor, self.config.backoff_ceiling);

        // Initial sweep, before start returns.
        let outcome = run_sweep(&fetcher, self.store.as_ref(), &self.config).await;
        observe_outcome(&mut backoff, outcome);

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            fetcher,
            Arc::clone(&self.store),
            self.config.clone(),
            backoff,
            shutdown.clone(),
        ));

        *state = State::Running { shutdown, task };
    }

    /// Stops polling.
    ///
    /// Cancels the pending inter-sweep wait immediately; an in-flight sweep
    /// finishes, but no new sweep is scheduled. Idempotent; a no-op before
    /// `start()`.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut *state, State::Stopped) {
            State::Running { shutdown, task } => {
                info!("stopping poller");
                shutdown.cancel();
                if let Err(err) = task.await {
                    warn!(error = %err, "poller task terminated abnormally");
                }
            }
            State::Idle => {
                debug!("stop called before start");
                *state = State::Idle;
            }
            State::Stopped => {}
        }
    }
}

/// The periodic cycle: cancellable wait, then sweep, then feed the backoff
/// controller.
async fn run_loop<F, S>(
    fetcher: F,
    store: Arc<S>,
    config: PollerConfig,
    mut backoff: Backoff,
    shutdown: CancellationToken,
) where
    F: RunFetcher + Send + Sync + 'static,
    S: RunStore + 'static,
{
    info!("poller loop started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(backoff.current()) => {}
        }
        if shutdown.is_cancelled() {
            break;
        }

        let outcome = run_sweep(&fetcher, store.as_ref(), &config).await;
        observe_outcome(&mut backoff, outcome);
    }

    info!("poller loop stopped");
}

fn observe_outcome(backoff: &mut Backoff, outcome: SweepOutcome) {
    let next_delay = if outcome.is_clean() {
        backoff.record_success()
    } else {
        backoff.record_failure()
    };
    debug!(
        repos = outcome.repos,
        fetch_failures = outcome.fetch_failures,
        next_delay_secs = next_delay.as_secs(),
        "sweep complete"
    );
}

/// One pass of fetch+reconcile over every currently tracked repository.
///
/// The repository list is snapshotted at sweep start; repositories added or
/// removed mid-sweep take effect next sweep. Each repository's failure is
/// isolated and logged; only the aggregate outcome reaches the caller.
#[instrument(skip_all)]
pub(crate) async fn run_sweep<F, S>(fetcher: &F, store: &S, config: &PollerConfig) -> SweepOutcome
where
    F: RunFetcher,
    S: RunStore + ?Sized,
{
    let repos = match store.list_tracked_repositories() {
        Ok(repos) => repos,
        Err(err) => {
            warn!(error = %err, "failed to list tracked repositories; skipping sweep");
            return SweepOutcome {
                repos: 0,
                fetch_failures: 0,
            };
        }
    };

    let mut outcome = SweepOutcome {
        repos: repos.len(),
        fetch_failures: 0,
    };

    for tracked in repos {
        match sweep_repo(fetcher, store, config, &tracked.id).await {
            Ok(applied) => {
                debug!(repo = %tracked.id, applied, "reconciled repository");
                if let Err(err) = store.record_polled(&tracked.id, Utc::now()) {
                    warn!(repo = %tracked.id, error = %err, "failed to record poll time");
                }
            }
            Err(err) => {
                outcome.fetch_failures += 1;
                warn!(repo = %tracked.id, error = %err, "fetch failed; continuing sweep");
            }
        }
    }

    outcome
}

/// Fetch and reconcile a single repository. Returns the number of store
/// writes applied.
async fn sweep_repo<F, S>(
    fetcher: &F,
    store: &S,
    config: &PollerConfig,
    repo: &RepoId,
) -> Result<usize, FetchError>
where
    F: RunFetcher,
    S: RunStore + ?Sized,
{
    let snapshots = match tokio::time::timeout(config.fetch_timeout, fetcher.fetch_runs(repo)).await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(FetchError::transient(format!(
                "fetch timed out after {}s",
                config.fetch_timeout.as_secs()
            )));
        }
    };

    let prior = match store.recent_runs(repo, config.lookback_runs) {
        Ok(prior) => prior,
        Err(err) => {
            // Local trouble, not remote load: logged, and the repository is
            // skipped without feeding the backoff signal.
            warn!(repo = %repo, error = %err, "failed to load prior runs; skipping repository");
            return Ok(0);
        }
    };

    let actions = reconcile(repo, &snapshots, &prior);
    Ok(apply_actions(store, repo, actions))
}
