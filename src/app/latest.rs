use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Sequence number stamped on one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Latest-wins guard for overlapping asynchronous requests.
///
/// Every request takes a [`Generation`] from [`LatestWins::begin`]. When it
/// completes, [`LatestWins::accept`] hands the result back only if no newer
/// request was started in the meantime; results of superseded requests are
/// dropped, whatever order they finish in.
#[derive(Debug, Default)]
pub struct LatestWins {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl LatestWins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request and stamp it with the next generation.
    pub fn begin(&self) -> Generation {
        Generation(self.issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `generation` is still the newest request issued.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.issued.load(Ordering::Acquire) == generation.0
    }

    /// Return `value` if it belongs to the newest request and nothing newer
    /// has been applied yet.
    pub fn accept<T>(&self, generation: Generation, value: T) -> Option<T> {
        if !self.is_current(generation) {
            debug!(
                generation = generation.0,
                latest = self.issued.load(Ordering::Acquire),
                "Dropping stale result"
            );
            return None;
        }
        let previous = self.applied.fetch_max(generation.0, Ordering::AcqRel);
        if previous >= generation.0 {
            return None;
        }
        Some(value)
    }

    /// Run `task` as a new request; `None` when it was superseded.
    pub async fn run<F, T>(&self, task: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let generation = self.begin();
        let value = task.await;
        self.accept(generation, value)
    }
}
