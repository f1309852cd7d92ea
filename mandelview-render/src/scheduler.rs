use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use mandelview_core::{Mandelbrot, Viewport};

use crate::buffer::PixelBuffer;
use crate::palette::Palette;
use crate::pool::WorkerPool;
use crate::renderer::{render_pass, RenderCancel};

/// How a new dispatch treats passes that are still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Fire and forget: earlier passes keep running and may interleave their
    /// writes with the new one.
    #[default]
    Overlap,
    /// Earlier passes stop at their next row boundary.
    SingleFlight,
}

/// Everything a pass needs, copied out of the interactive state at dispatch.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob {
    pub viewport: Viewport,
    pub step_budget: u32,
    pub palette: &'static Palette,
}

/// Sent back by every pass when it returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderReport {
    pub id: u64,
    pub elapsed: Duration,
    pub cancelled: bool,
    pub rows_completed: u32,
    pub workers: usize,
}

/// Dispatches render passes onto the worker pool and collects their reports.
///
/// All passes paint the same [`PixelBuffer`]. Dispatch never blocks; the
/// caller learns about completion through [`try_reports`](Self::try_reports)
/// or [`wait_for`](Self::wait_for).
pub struct RenderScheduler {
    pool: WorkerPool,
    buffer: Arc<PixelBuffer>,
    cancel: Arc<RenderCancel>,
    policy: DispatchPolicy,
    next_id: u64,
    last_elapsed_us: Arc<AtomicU64>,
    tx: mpsc::Sender<RenderReport>,
    rx: mpsc::Receiver<RenderReport>,
    backlog: VecDeque<RenderReport>,
    /// Dispatched passes whose report has not come off the channel yet.
    in_flight: HashSet<u64>,
}

impl RenderScheduler {
    pub fn new(pool: WorkerPool, width: u32, height: u32, policy: DispatchPolicy) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            pool,
            buffer: Arc::new(PixelBuffer::new(width, height)),
            cancel: Arc::new(RenderCancel::new()),
            policy,
            next_id: 0,
            last_elapsed_us: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
            backlog: VecDeque::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Start a pass and return its id without waiting for it.
    pub fn dispatch(&mut self, job: RenderJob) -> u64 {
        let started = Instant::now();
        self.next_id += 1;
        let id = self.next_id;
        self.in_flight.insert(id);

        let generation = match self.policy {
            DispatchPolicy::Overlap => self.cancel.generation(),
            DispatchPolicy::SingleFlight => self.cancel.cancel(),
        };

        let workers = self.pool.workers();
        debug!(
            id,
            workers,
            steps = job.step_budget,
            zoom = job.viewport.zoom,
            policy = ?self.policy,
            "Dispatching render"
        );

        let buffer = Arc::clone(&self.buffer);
        let cancel = Arc::clone(&self.cancel);
        let last_elapsed_us = Arc::clone(&self.last_elapsed_us);
        let tx = self.tx.clone();

        self.pool.handle().spawn(move || {
            let fractal = Mandelbrot::new(job.step_budget);
            let outcome = render_pass(
                &fractal,
                &job.viewport,
                job.palette,
                &buffer,
                &cancel,
                generation,
                started,
            );
            if !outcome.cancelled {
                last_elapsed_us.store(outcome.elapsed.as_micros() as u64, Ordering::Relaxed);
            }
            // The scheduler may already be gone; nobody is left to tell.
            let _ = tx.send(RenderReport {
                id,
                elapsed: outcome.elapsed,
                cancelled: outcome.cancelled,
                rows_completed: outcome.rows_completed,
                workers,
            });
        });

        id
    }

    /// Block until the pass with `id` reports.
    ///
    /// Reports for later passes that arrive first are kept for a later call;
    /// reports for earlier passes are discarded. Returns `None` at once for
    /// an id that was never dispatched or whose report was already handed
    /// out.
    pub fn wait_for(&mut self, id: u64) -> Option<RenderReport> {
        if let Some(pos) = self.backlog.iter().position(|r| r.id == id) {
            let report = self.backlog.remove(pos);
            self.backlog.retain(|r| r.id > id);
            return report;
        }
        if !self.in_flight.contains(&id) {
            return None;
        }
        loop {
            let report = self.rx.recv().ok()?;
            self.in_flight.remove(&report.id);
            if report.id == id {
                self.backlog.retain(|r| r.id > id);
                return Some(report);
            }
            if report.id > id {
                self.backlog.push_back(report);
            }
        }
    }

    /// Drain every report that has arrived so far, oldest first.
    pub fn try_reports(&mut self) -> Vec<RenderReport> {
        let mut reports: Vec<_> = self.backlog.drain(..).collect();
        for report in self.rx.try_iter() {
            self.in_flight.remove(&report.id);
            reports.push(report);
        }
        reports.sort_by_key(|r| r.id);
        reports
    }

    /// Abandon in-flight passes at their next row boundary, whatever the
    /// policy.
    pub fn cancel_in_flight(&self) {
        self.cancel.cancel();
    }

    /// Duration of the most recent pass that ran to completion.
    pub fn last_elapsed(&self) -> Duration {
        Duration::from_micros(self.last_elapsed_us.load(Ordering::Relaxed))
    }

    /// Rows finished by the pass currently running, out of its total.
    pub fn progress(&self) -> (usize, usize) {
        self.cancel.progress()
    }

    pub fn buffer(&self) -> &Arc<PixelBuffer> {
        &self.buffer
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    pub fn max_workers(&self) -> usize {
        self.pool.max_workers()
    }

    /// Grow the pool used by the next dispatch.
    pub fn grow_workers(&mut self) -> crate::Result<bool> {
        self.pool.grow()
    }

    /// Shrink the pool used by the next dispatch.
    pub fn shrink_workers(&mut self) -> crate::Result<bool> {
        self.pool.shrink()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{Rgb, BUILTIN_PALETTES};

    fn job(width: u32, height: u32, step_budget: u32) -> RenderJob {
        RenderJob {
            viewport: Viewport::initial(width, height).unwrap(),
            step_budget,
            palette: &BUILTIN_PALETTES[0],
        }
    }

    fn scheduler(width: u32, height: u32, policy: DispatchPolicy) -> RenderScheduler {
        RenderScheduler::new(WorkerPool::new(2, 4).unwrap(), width, height, policy)
    }

    #[test]
    fn dispatch_then_wait() {
        let mut s = scheduler(120, 80, DispatchPolicy::Overlap);
        let id = s.dispatch(job(120, 80, 128));
        let report = s.wait_for(id).unwrap();

        assert_eq!(report.id, id);
        assert!(!report.cancelled);
        assert_eq!(report.rows_completed, 80);
        assert_eq!(report.workers, 2);
        assert_eq!(s.last_elapsed(), Duration::from_micros(report.elapsed.as_micros() as u64));
        assert_ne!(s.buffer().get(0, 0), Rgb::BLACK);
    }

    #[test]
    fn ids_increase() {
        let mut s = scheduler(16, 16, DispatchPolicy::Overlap);
        let a = s.dispatch(job(16, 16, 16));
        let b = s.dispatch(job(16, 16, 16));
        assert!(b > a);
        assert!(s.wait_for(b).is_some());
    }

    #[test]
    fn overlapping_passes_all_complete() {
        let mut s = scheduler(64, 48, DispatchPolicy::Overlap);
        let ids: Vec<_> = (0..3).map(|_| s.dispatch(job(64, 48, 64))).collect();

        let mut reports = Vec::new();
        for &id in &ids {
            reports.push(s.wait_for(id).unwrap());
        }
        assert!(reports.iter().all(|r| !r.cancelled && r.rows_completed == 48));
    }

    #[test]
    fn later_report_arriving_first_is_kept() {
        let mut s = scheduler(32, 32, DispatchPolicy::Overlap);
        let first = s.dispatch(job(32, 32, 32));
        let second = s.dispatch(job(32, 32, 32));
        assert_eq!(s.wait_for(first).map(|r| r.id), Some(first));
        assert_eq!(s.wait_for(second).map(|r| r.id), Some(second));
    }

    #[test]
    fn single_flight_final_pass_is_complete() {
        let mut s = scheduler(200, 150, DispatchPolicy::SingleFlight);
        for _ in 0..4 {
            s.dispatch(job(200, 150, 2_000));
        }
        let last = s.dispatch(job(200, 150, 64));
        let report = s.wait_for(last).unwrap();
        assert!(!report.cancelled);
        assert_eq!(report.rows_completed, 150);
    }

    #[test]
    fn resize_affects_next_dispatch() {
        let mut s = scheduler(16, 16, DispatchPolicy::Overlap);
        let before = s.dispatch(job(16, 16, 16));
        assert!(s.grow_workers().unwrap());
        let after = s.dispatch(job(16, 16, 16));

        assert_eq!(s.wait_for(before).unwrap().workers, 2);
        assert_eq!(s.wait_for(after).unwrap().workers, 3);
    }

    #[test]
    fn try_reports_collects_without_blocking() {
        let mut s = scheduler(16, 16, DispatchPolicy::Overlap);
        assert!(s.try_reports().is_empty());
        let id = s.dispatch(job(16, 16, 16));

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut reports = Vec::new();
        while reports.is_empty() && Instant::now() < deadline {
            reports = s.try_reports();
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, id);
    }

    #[test]
    fn single_flight_abandons_queued_passes() {
        let mut s = RenderScheduler::new(
            WorkerPool::new(1, 1).unwrap(),
            64,
            48,
            DispatchPolicy::SingleFlight,
        );

        // Hold the only worker so every pass is still queued when the next
        // dispatch advances the generation.
        let (release, gate) = mpsc::channel::<()>();
        s.pool.handle().spawn(move || {
            let _ = gate.recv();
        });

        let ids: Vec<_> = (0..4).map(|_| s.dispatch(job(64, 48, 64))).collect();
        release.send(()).unwrap();

        let (last, earlier) = ids.split_last().unwrap();
        for &id in earlier {
            let report = s.wait_for(id).unwrap();
            assert!(report.cancelled, "pass {id} should be abandoned");
            assert!(report.rows_completed < 48);
        }
        let report = s.wait_for(*last).unwrap();
        assert!(!report.cancelled);
        assert_eq!(report.rows_completed, 48);
    }

    #[test]
    fn wait_for_unknown_or_consumed_id_returns_none() {
        let mut s = scheduler(16, 16, DispatchPolicy::Overlap);
        assert_eq!(s.wait_for(42), None);

        let id = s.dispatch(job(16, 16, 16));
        assert!(s.wait_for(id).is_some());
        assert_eq!(s.wait_for(id), None, "a report is handed out once");
        assert_eq!(s.wait_for(id + 1), None);
    }
}
