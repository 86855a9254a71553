//! Concurrency limiter sized to the process file-descriptor budget
//!
//! Each in-flight probe holds one descriptor (direct) or one multiplexed
//! channel (bastion). Without this gate a wide range scan would attempt tens
//! of thousands of simultaneous connections and exhaust the descriptor table,
//! turning accurate results into spurious failures.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Capacity used when the descriptor limit cannot be read.
pub const DEFAULT_FD_BUDGET: usize = 256;

/// Counting admission gate shared by all probe tasks of one scan.
///
/// Capacity is fixed at construction and never reconfigured mid-scan. Each
/// scan engine builds its own limiter, so concurrent scans keep independent
/// admission budgets.
pub struct ProbeLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ProbeLimiter {
    /// Limiter sized to the soft open-file limit, defaulting to
    /// [`DEFAULT_FD_BUDGET`] when the limit is unreadable.
    pub fn from_fd_budget() -> Self {
        Self::with_capacity(fd_budget())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held by probe tasks.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    /// Wait for a free slot. The slot is returned when the permit drops.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("limiter semaphore closed")
    }
}

#[cfg(unix)]
fn fd_budget() -> usize {
    match rlimit::Resource::NOFILE.get() {
        Ok((soft, _hard)) => soft.min(Semaphore::MAX_PERMITS as u64) as usize,
        Err(_) => DEFAULT_FD_BUDGET,
    }
}

#[cfg(not(unix))]
fn fd_budget() -> usize {
    DEFAULT_FD_BUDGET
}
