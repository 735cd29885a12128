//! Adaptive backoff between sweeps.
//!
//! The controller holds a single process-wide delay value, evaluated once per
//! full sweep: a clean sweep resets the delay to the floor, a sweep with at
//! least one fetch failure doubles it up to the ceiling. Doubling backs off
//! conservatively under sustained rate-limiting without exceeding the ceiling
//! (bounded staleness), and the reset returns to full responsiveness as soon
//! as the remote recovers.
//!
//! Coarse-grained on purpose: one struggling repository degrades the polling
//! frequency for all of them, because every fetch draws on the same shared,
//! account-wide rate limit.

use std::time::Duration;

/// The backoff controller's state: a single delay within `[floor, ceiling]`.
#[derive(Debug, Clone)]
pub struct Backoff {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    /// Creates a controller initialized to the floor.
    ///
    /// The ceiling is clamped up to at least the floor.
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        let ceiling = ceiling.max(floor);
        Backoff {
            floor,
            ceiling,
            current: floor,
        }
    }

    /// The current delay until the next sweep.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// A sweep completed with zero fetch failures: reset to the floor,
    /// regardless of prior history.
    pub fn record_success(&mut self) -> Duration {
        self.current = self.floor;
        self.current
    }

    /// A sweep had at least one fetch failure: double the delay, capped at
    /// the ceiling.
    pub fn record_failure(&mut self) -> Duration {
        self.current = self.current.saturating_mul(2).min(self.ceiling);
        self.current
    }
}
