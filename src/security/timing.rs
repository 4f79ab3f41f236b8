//! Fixed-latency execution for secret-dependent operations.
//!
//! # Responsibilities
//! - Run a future and hold its result until a minimum latency has passed
//! - Measure with the monotonic clock, starting right before the future runs
//!
//! # Design Decisions
//! - Sleeping is per-task (`tokio::time::sleep`); no lock is held meanwhile
//! - Overrunning the budget returns immediately, never a negative sleep

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Minimum observable latency applied around a store round trip.
#[derive(Debug, Clone, Copy)]
pub struct LatencyFloor {
    budget: Duration,
}

impl LatencyFloor {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Await `operation`, then sleep out whatever remains of the budget.
    pub async fn run<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        let started = Instant::now();
        let output = operation.await;
        tokio::time::sleep_until(started + self.budget).await;
        output
    }
}
