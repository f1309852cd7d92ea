use std::path::Path;

use tracing::{debug, info};

use mandelview_core::{SelectionRect, Viewport};
use mandelview_render::{
    export_png, ExportMetadata, PaletteSet, RenderJob, RenderReport, RenderScheduler, WorkerPool,
};

use crate::error::Result;
use crate::settings::Settings;
use crate::status::Status;

/// Step budget change per `c` / `C` key press.
pub const STEP_STRIDE: u32 = 256;

/// A user intent. Each one changes a single piece of state and re-renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    PanTo { x: i32, y: i32 },
    Select(SelectionRect),
    Reset,
    NextPalette,
    PreviousPalette,
    MoreSteps,
    FewerSteps,
    MoreWorkers,
    FewerWorkers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub step_budget: u32,
    pub initial_step_budget: u32,
}

impl RenderConfig {
    pub fn new(step_budget: u32) -> Self {
        Self {
            step_budget,
            initial_step_budget: step_budget,
        }
    }

    pub fn more_steps(&mut self) {
        self.step_budget = self.step_budget.saturating_add(STEP_STRIDE);
    }

    /// Never drops below zero.
    pub fn fewer_steps(&mut self) {
        self.step_budget = self.step_budget.saturating_sub(STEP_STRIDE);
    }

    pub fn reset(&mut self) {
        self.step_budget = self.initial_step_budget;
    }
}

/// Owns the interactive state and hands render passes to the scheduler.
///
/// All mutation goes through `&mut self`, so there is exactly one writer.
/// Render passes work on copies taken at dispatch.
pub struct Controller {
    viewport: Viewport,
    palettes: PaletteSet,
    config: RenderConfig,
    scheduler: RenderScheduler,
}

impl Controller {
    pub fn new(settings: &Settings) -> Result<Self> {
        let viewport = settings.viewport()?;
        let pool = WorkerPool::new(settings.initial_workers(), settings.max_workers())?;
        let scheduler = RenderScheduler::new(
            pool,
            viewport.width,
            viewport.height,
            settings.dispatch_policy.into(),
        );
        let palettes = PaletteSet::builtin().with_active(settings.palette_index);

        info!(
            width = viewport.width,
            height = viewport.height,
            workers = scheduler.workers(),
            max_workers = scheduler.max_workers(),
            steps = settings.initial_step_budget,
            "Controller ready"
        );

        Ok(Self::from_parts(
            viewport,
            palettes,
            RenderConfig::new(settings.initial_step_budget),
            scheduler,
        ))
    }

    pub fn from_parts(
        viewport: Viewport,
        palettes: PaletteSet,
        config: RenderConfig,
        scheduler: RenderScheduler,
    ) -> Self {
        Self {
            viewport,
            palettes,
            config,
            scheduler,
        }
    }

    /// Apply `command` and dispatch a render of the resulting state.
    ///
    /// Only a failed pool rebuild can fail; the state is then unchanged and
    /// nothing is dispatched.
    pub fn apply(&mut self, command: Command) -> Result<u64> {
        debug!(?command, "Applying command");
        match command {
            Command::ZoomIn => {
                let (x, y) = self.viewport.center_pixel();
                self.viewport.zoom_in(x, y);
            }
            Command::ZoomOut => {
                let (x, y) = self.viewport.center_pixel();
                self.viewport.zoom_out(x, y);
            }
            Command::PanTo { x, y } => self.viewport.pan_to(x, y),
            Command::Select(rect) => self.viewport.apply_selection(&rect),
            Command::Reset => {
                self.viewport.reset();
                self.config.reset();
            }
            Command::NextPalette => {
                self.palettes.cycle_next();
            }
            Command::PreviousPalette => {
                self.palettes.cycle_previous();
            }
            Command::MoreSteps => self.config.more_steps(),
            Command::FewerSteps => self.config.fewer_steps(),
            Command::MoreWorkers => {
                self.scheduler.grow_workers()?;
            }
            Command::FewerWorkers => {
                self.scheduler.shrink_workers()?;
            }
        }
        Ok(self.render())
    }

    /// Dispatch a render of the current state without waiting for it.
    pub fn render(&mut self) -> u64 {
        self.scheduler.dispatch(RenderJob {
            viewport: self.viewport,
            step_budget: self.config.step_budget,
            palette: self.palettes.active(),
        })
    }

    /// Block until render `id` reports.
    pub fn wait_for(&mut self, id: u64) -> Option<RenderReport> {
        self.scheduler.wait_for(id)
    }

    pub fn status(&self) -> Status {
        Status {
            width: self.viewport.width,
            height: self.viewport.height,
            workers: self.scheduler.workers(),
            step_budget: self.config.step_budget,
            palette_index: self.palettes.active_index(),
            elapsed: self.scheduler.last_elapsed(),
        }
    }

    /// Write the current buffer to `path` with the view as PNG metadata.
    pub fn export(&self, path: &Path) -> Result<()> {
        let metadata = ExportMetadata::new(
            &self.viewport,
            self.config.step_budget,
            self.palettes.active().name,
        );
        export_png(self.scheduler.buffer(), path, &metadata)?;
        info!(path = %path.display(), "Saved image");
        Ok(())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}
