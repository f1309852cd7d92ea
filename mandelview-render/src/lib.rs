pub mod buffer;
pub mod error;
pub mod export;
pub mod palette;
pub mod pool;
pub mod renderer;
pub mod scheduler;

pub use buffer::PixelBuffer;
pub use error::RenderError;
pub use export::{export_png, ExportMetadata};
pub use palette::{Palette, PaletteSet, Rgb, BUILTIN_PALETTES, PALETTE_SIZE};
pub use pool::{hardware_concurrency, WorkerPool};
pub use renderer::{render, render_pass, RenderCancel, RenderOutcome};
pub use scheduler::{DispatchPolicy, RenderJob, RenderReport, RenderScheduler};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
