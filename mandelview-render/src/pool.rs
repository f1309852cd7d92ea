use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::error::RenderError;

/// Below this size the pool grows and shrinks one worker at a time; from
/// here on it doubles and halves.
const LINEAR_LIMIT: usize = 3;

/// Number of hardware threads, at least 1.
pub fn hardware_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Next size up: `+1` below 3, doubled from 3, capped at `max`.
pub fn grown(workers: usize, max: usize) -> usize {
    if workers >= max {
        return workers;
    }
    let next = if workers < LINEAR_LIMIT {
        workers + 1
    } else {
        workers * 2
    };
    next.min(max)
}

/// Next size down: halved above 3, `-1` from 3, never below 1.
pub fn shrunk(workers: usize) -> usize {
    if workers <= 1 {
        return 1;
    }
    if workers > LINEAR_LIMIT {
        workers / 2
    } else {
        workers - 1
    }
}

fn build(workers: usize) -> crate::Result<Arc<ThreadPool>> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("mandelview-render-{i}"))
        .build()
        .map(Arc::new)
        .map_err(|source| RenderError::Pool { workers, source })
}

/// A fixed-size rayon pool that is swapped out, never mutated, on resize.
///
/// Replacing the handle drops this pool's reference to the old pool. Rayon
/// still runs every job already spawned on it, so in-flight and queued passes
/// finish on the old workers before its threads exit.
pub struct WorkerPool {
    pool: Arc<ThreadPool>,
    workers: usize,
    max_workers: usize,
}

impl WorkerPool {
    /// Build a pool of `workers` threads, clamped to `[1, max_workers]`.
    pub fn new(workers: usize, max_workers: usize) -> crate::Result<Self> {
        let max_workers = max_workers.max(1);
        let workers = workers.clamp(1, max_workers);
        Ok(Self {
            pool: build(workers)?,
            workers,
            max_workers,
        })
    }

    /// Half the hardware threads, bounded by all of them.
    pub fn with_default_size() -> crate::Result<Self> {
        let max = hardware_concurrency();
        Self::new(max / 2, max)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// The pool the next dispatch will run on.
    pub fn handle(&self) -> Arc<ThreadPool> {
        Arc::clone(&self.pool)
    }

    /// Run `op` inside the pool so its parallel iterators use these workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Grow per the resize policy. Returns `false` at the upper bound.
    pub fn grow(&mut self) -> crate::Result<bool> {
        self.resize(grown(self.workers, self.max_workers))
    }

    /// Shrink per the resize policy. Returns `false` at one worker.
    pub fn shrink(&mut self) -> crate::Result<bool> {
        self.resize(shrunk(self.workers))
    }

    /// Replace the pool with one of `workers` threads (clamped). Returns
    /// whether the size changed.
    pub fn resize(&mut self, workers: usize) -> crate::Result<bool> {
        let workers = workers.clamp(1, self.max_workers);
        if workers == self.workers {
            return Ok(false);
        }
        let pool = build(workers)?;
        info!(from = self.workers, to = workers, "Resizing worker pool");
        self.pool = pool;
        self.workers = workers;
        Ok(true)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("max_workers", &self.max_workers)
            .finish()
    }
}
