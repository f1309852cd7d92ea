pub mod complex;
pub mod error;
pub mod fractal;
pub mod mandelbrot;
pub mod selection;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use fractal::{EscapeResult, EscapeTime};
pub use mandelbrot::{evaluate, Mandelbrot};
pub use selection::SelectionRect;
pub use viewport::{Anchor, Viewport};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
