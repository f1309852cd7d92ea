use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use mandelview_core::{EscapeTime, Viewport};

use crate::buffer::PixelBuffer;
use crate::palette::Palette;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Tracks the current render generation for cancellation and progress.
///
/// A pass remembers the generation it was started under and stops picking up
/// new rows once the generation moves on. The progress counters count rows
/// and are shared by every pass using this handle, so overlapping passes
/// blur them together.
#[derive(Debug)]
pub struct RenderCancel {
    generation: AtomicU64,
    progress_done: AtomicUsize,
    progress_total: AtomicUsize,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            progress_done: AtomicUsize::new(0),
            progress_total: AtomicUsize::new(0),
        }
    }

    /// Cancel every pass started so far by advancing the generation.
    /// Returns the new generation.
    pub fn cancel(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Read the current generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Reset progress for a new pass with `total` rows.
    pub fn reset_progress(&self, total: usize) {
        self.progress_total.store(total, Ordering::Relaxed);
        self.progress_done.store(0, Ordering::Relaxed);
    }

    /// Increment completed rows by one.
    pub fn inc_progress(&self) {
        self.progress_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current progress as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.progress_done.load(Ordering::Relaxed),
            self.progress_total.load(Ordering::Relaxed),
        )
    }
}

impl Default for RenderCancel {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What a finished (or abandoned) pass reports back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOutcome {
    /// Wall time from `started` to the last pixel write.
    pub elapsed: Duration,
    pub cancelled: bool,
    pub rows_completed: u32,
}

// ---------------------------------------------------------------------------
// Full-frame render
// ---------------------------------------------------------------------------

/// Paint one row. Every pixel is independent of every other.
fn render_row<F: EscapeTime>(
    fractal: &F,
    viewport: &Viewport,
    palette: &Palette,
    buffer: &PixelBuffer,
    py: u32,
) {
    for px in 0..viewport.width {
        let c = viewport.pixel_to_complex(px, py);
        buffer.set(px, py, palette.pixel(fractal.evaluate(c)));
    }
}

/// Render a full frame into `buffer` on the current rayon pool.
///
/// Rows are the unit of work and run in parallel; each writes only its own
/// cells. Rows not yet started when `cancel` leaves `generation` are skipped.
/// `started` is the instant the pass was requested, so queueing delay counts
/// towards the reported time.
pub fn render_pass<F: EscapeTime + Sync>(
    fractal: &F,
    viewport: &Viewport,
    palette: &Palette,
    buffer: &PixelBuffer,
    cancel: &RenderCancel,
    generation: u64,
    started: Instant,
) -> RenderOutcome {
    debug_assert_eq!((buffer.width, buffer.height), (viewport.width, viewport.height));
    let rows_done = AtomicUsize::new(0);
    cancel.reset_progress(viewport.height as usize);
    debug!(
        width = viewport.width,
        height = viewport.height,
        steps = fractal.step_budget(),
        palette = palette.name,
        generation,
        "Starting render pass"
    );

    (0..viewport.height).into_par_iter().for_each(|py| {
        if cancel.generation() != generation {
            return;
        }
        render_row(fractal, viewport, palette, buffer, py);
        rows_done.fetch_add(1, Ordering::Relaxed);
        cancel.inc_progress();
    });

    let elapsed = started.elapsed();
    let rows_completed = rows_done.into_inner() as u32;
    let cancelled = rows_completed < viewport.height;
    info!(
        elapsed_ms = elapsed.as_millis(),
        rows_completed, cancelled, "Render complete"
    );

    RenderOutcome {
        elapsed,
        cancelled,
        rows_completed,
    }
}

/// Render synchronously under the current generation.
pub fn render<F: EscapeTime + Sync>(
    fractal: &F,
    viewport: &Viewport,
    palette: &Palette,
    buffer: &PixelBuffer,
    cancel: &RenderCancel,
) -> RenderOutcome {
    render_pass(
        fractal,
        viewport,
        palette,
        buffer,
        cancel,
        cancel.generation(),
        Instant::now(),
    )
}
