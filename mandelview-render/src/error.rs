use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build a worker pool of {workers} threads")]
    Pool {
        workers: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode PNG: {0}")]
    Png(#[from] png::EncodingError),

    #[error(transparent)]
    Core(#[from] mandelview_core::CoreError),
}
