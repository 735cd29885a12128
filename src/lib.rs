//! run-watch - keeps a local view of CI workflow runs in sync with a
//! rate-limited, polling-only remote API.
//!
//! This library provides the polling/reconciliation engine: the scheduler
//! that triggers periodic synchronization, the diff logic that decides
//! insert-vs-update for each observed run, and the adaptive backoff
//! controller that paces requests per sweep outcome.

pub mod github;
pub mod poller;
pub mod store;
pub mod types;
