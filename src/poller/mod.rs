//! The polling/reconciliation engine.
//!
//! Keeps the local run view consistent with the rate-limited, polling-only
//! remote API: the scheduler triggers periodic synchronization, the
//! reconciler decides insert-vs-update for each observed run, and the backoff
//! controller paces requests per sweep outcome.

mod backoff;
mod config;
mod reconcile;
mod scheduler;


pub use backoff::Backoff;
pub use config::PollerConfig;
pub use reconcile::{ReconcileAction, ReconcileError, apply_actions, reconcile};
pub use scheduler::{PollScheduler, SchedulerStatus, SweepOutcome};
